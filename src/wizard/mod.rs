//! Clarifying-questions wizard
//!
//! Each browser session walks a small state machine:
//!
//! ```text
//! Initial --submit(topic)--> AwaitingAnswers --continue(answers)--> Reporting
//!                             |        ^
//!                             +--------+ regenerate
//! ```
//!
//! `reset` returns any state to `Initial`; `cancel` stops a streaming report
//! and keeps what has already arrived.
//!
//! - [`state::WizardState`] holds the pure transitions and renders a [`WizardView`]
//! - [`session::SessionStore`] keeps sessions in memory with idle expiry
//! - [`service::WizardService`] drives both against a [`ResearchPipeline`](crate::research::ResearchPipeline)

/// Session-driven orchestration.
pub mod service;
/// In-memory session storage.
pub mod session;
/// State machine and view model.
pub mod state;

pub use service::{ReportEvent, ReportEvents, WizardService};
pub use session::{Session, SessionStore};
pub use state::{AnswerField, ReportStatus, Stage, WizardState, WizardView};
