//! Tools used by the research agents
//!
//! # Web Search
//! Searches the web and returns result snippets:
//! ```ignore
//! let hits = DaedraSearch::new().search("remote work housing", 5).await?;
//! for hit in hits {
//!     println!("{}: {}", hit.title, hit.url);
//! }
//! ```

/// Web search via DuckDuckGo.
pub mod search;

pub use search::{DaedraSearch, WebSearch};
