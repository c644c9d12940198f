use crate::AppState;
use crate::api::handlers::{sessions, ui};
use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;

/// OpenAPI description of the session API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Deep Research",
        description = "Topic in, three clarifying questions, streamed markdown report out"
    ),
    paths(
        sessions::create_session,
        sessions::get_session,
        sessions::delete_session,
        sessions::submit_topic,
        sessions::regenerate,
        sessions::continue_research,
        sessions::cancel,
        sessions::reset,
    ),
    components(schemas(
        crate::types::SessionCreated,
        crate::types::TopicRequest,
        crate::types::ContinueRequest,
        crate::types::StreamPayload,
        crate::wizard::WizardView,
        crate::wizard::AnswerField,
        crate::wizard::Stage,
        crate::wizard::ReportStatus,
    )),
    tags((name = "sessions", description = "Clarifying-questions wizard sessions"))
)]
pub struct ApiDoc;

/// Session routes, mounted under `/api`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{id}/topic", post(sessions::submit_topic))
        .route("/sessions/{id}/regenerate", post(sessions::regenerate))
        .route("/sessions/{id}/continue", post(sessions::continue_research))
        .route("/sessions/{id}/cancel", post(sessions::cancel))
        .route("/sessions/{id}/reset", post(sessions::reset))
        .route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn health() -> &'static str {
    "OK"
}

/// The complete application: page, health check and API
pub fn build_app(state: AppState) -> Router {
    let max_body = state.config_manager.config().server.max_body_bytes;

    Router::new()
        .route("/", get(ui::index))
        .route("/assets/{*path}", get(ui::asset))
        .route("/health", get(health))
        .nest("/api", create_router())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
