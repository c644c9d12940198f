//! Configuration and rendering utilities.

/// TOML configuration (`research.toml`) with hot reload.
pub mod toml_config;

/// Markdown report rendering.
pub mod markdown;
