use crate::{
    AppState,
    types::{ContinueRequest, Result, SessionCreated, StreamPayload, TopicRequest},
    wizard::{ReportEvent, WizardView},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use uuid::Uuid;

/// Start a new wizard session
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionCreated)
    ),
    tag = "sessions"
)]
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let (session_id, view) = state.wizard.create_session();
    (StatusCode::CREATED, Json(SessionCreated { session_id, view }))
}

/// Current view of a session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session view", body = WizardView),
        (status = 404, description = "Unknown session")
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>> {
    Ok(Json(state.wizard.view(id)?))
}

/// Delete a session, stopping any report in progress
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session")
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.wizard.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a research topic and generate clarifying questions
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/topic",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Questions generated", body = WizardView),
        (status = 400, description = "Blank topic"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Topic already submitted or generation in progress"),
        (status = 502, description = "Question generation failed")
    ),
    tag = "sessions"
)]
pub async fn submit_topic(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TopicRequest>,
) -> Result<Json<WizardView>> {
    Ok(Json(state.wizard.submit_topic(id, &payload.topic).await?))
}

/// Replace the questions for the current topic
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/regenerate",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "New questions", body = WizardView),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "No questions to regenerate"),
        (status = 502, description = "Question generation failed")
    ),
    tag = "sessions"
)]
pub async fn regenerate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>> {
    Ok(Json(state.wizard.regenerate(id).await?))
}

/// Answer the questions and stream the research report
///
/// Responds with `text/event-stream`. Events: `progress`, `chunk`, `error`,
/// `cancelled` and `done`, each carrying `{"text": ...}`.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/continue",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = ContinueRequest,
    responses(
        (status = 200, description = "Report event stream", body = StreamPayload, content_type = "text/event-stream"),
        (status = 400, description = "Answers must have exactly three entries"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "No questions awaiting answers")
    ),
    tag = "sessions"
)]
pub async fn continue_research(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContinueRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let events = state.wizard.continue_research(id, payload.answers)?;
    let stream = events.map(|event| Ok::<_, Infallible>(to_sse_event(&event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Stop a streaming report
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/cancel",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Report cancelled", body = WizardView),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "No report streaming")
    ),
    tag = "sessions"
)]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>> {
    Ok(Json(state.wizard.cancel(id)?))
}

/// Return the session to the topic form
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/reset",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session reset", body = WizardView),
        (status = 404, description = "Unknown session")
    ),
    tag = "sessions"
)]
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>> {
    Ok(Json(state.wizard.reset(id)?))
}

fn to_sse_event(event: &ReportEvent) -> Event {
    let payload = StreamPayload {
        text: event.text().to_string(),
    };
    Event::default()
        .event(event.name())
        .json_data(&payload)
        .unwrap_or_else(|_| Event::default().event(event.name()).data(payload.text))
}

