//! Deep research pipeline
//!
//! - [`enrichment::enrich_query`] folds a topic and its three answered
//!   clarifying questions into one prompt
//! - [`manager::ResearchManager`] turns that prompt into a streamed report:
//!   plan web searches, run them concurrently, summarize each, then stream
//!   the writer agent's markdown
//!
//! ```ignore
//! let questions = manager.generate_questions("Impact of remote work on urban housing").await?;
//! let query = enrich_query(topic, &questions, &answers);
//!
//! let mut stream = manager.run_full(query);
//! while let Some(update) = stream.next().await {
//!     if let ResearchUpdate::Chunk(text) = update? {
//!         print!("{}", text);
//!     }
//! }
//! ```

/// Topic + clarifications -> research prompt.
pub mod enrichment;
/// Search planning, concurrent search and report streaming.
pub mod manager;

pub use enrichment::enrich_query;
pub use manager::{ResearchManager, ResearchPipeline, ResearchStream, ResearchUpdate};
