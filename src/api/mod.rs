//! HTTP API Handlers and Routes
//!
//! The wizard is served as a single embedded page backed by a small JSON API.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Page
//! - `GET /` - The wizard page
//! - `GET /health` - Health check endpoint
//!
//! ## Sessions (`/api/sessions`)
//! - `POST /api/sessions` - Start a session
//! - `GET /api/sessions/{id}` - Current view
//! - `DELETE /api/sessions/{id}` - Delete a session
//! - `POST /api/sessions/{id}/topic` - Submit a topic, get three questions
//! - `POST /api/sessions/{id}/regenerate` - New questions for the same topic
//! - `POST /api/sessions/{id}/continue` - Answer and stream the report (SSE)
//! - `POST /api/sessions/{id}/cancel` - Stop a streaming report
//! - `POST /api/sessions/{id}/reset` - Back to the topic form
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api/openapi.json`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
