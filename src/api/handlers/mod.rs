//! API request handlers.

/// Wizard session handlers, including the report event stream.
pub mod sessions;
/// Embedded web page and static assets.
pub mod ui;
