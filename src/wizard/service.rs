use super::session::SessionStore;
use super::state::{CANCELLED_NOTICE, ReportStatus, WizardState, WizardView};
use crate::agents::QUESTION_COUNT;
use crate::research::{ResearchPipeline, ResearchUpdate};
use crate::types::{AppError, Result};
use crate::utils::toml_config::ConfigManager;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// What the report stream tells the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Progress(String),
    Chunk(String),
    /// The run failed; carries the notice shown under the partial report
    Error(String),
    Cancelled,
    Done,
}

impl ReportEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            ReportEvent::Progress(_) => "progress",
            ReportEvent::Chunk(_) => "chunk",
            ReportEvent::Error(_) => "error",
            ReportEvent::Cancelled => "cancelled",
            ReportEvent::Done => "done",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ReportEvent::Progress(t) | ReportEvent::Chunk(t) | ReportEvent::Error(t) => t,
            ReportEvent::Cancelled => CANCELLED_NOTICE,
            ReportEvent::Done => "",
        }
    }
}

pub type ReportEvents = std::pin::Pin<Box<dyn Stream<Item = ReportEvent> + Send>>;

/// Drives session state machines against a research pipeline
#[derive(Clone)]
pub struct WizardService {
    store: Arc<SessionStore>,
    pipeline: Arc<dyn ResearchPipeline>,
    config: Arc<ConfigManager>,
}

impl WizardService {
    pub fn new(pipeline: Arc<dyn ResearchPipeline>, config: Arc<ConfigManager>) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            pipeline,
            config,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn create_session(&self) -> (Uuid, WizardView) {
        let ttl = self.config.config().server.session_ttl_secs;
        let purged = self
            .store
            .purge_expired(chrono::Duration::seconds(ttl as i64));
        if purged > 0 {
            tracing::info!(purged, "Dropped expired sessions");
        }

        let (id, view) = self.store.create();
        tracing::info!(session = %id, "Session created");
        (id, view)
    }

    pub fn view(&self, id: Uuid) -> Result<WizardView> {
        self.store.view(id)
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.store.remove(id)?;
        tracing::info!(session = %id, "Session deleted");
        Ok(())
    }

    /// `Initial -> AwaitingAnswers`
    pub async fn submit_topic(&self, id: Uuid, topic: &str) -> Result<WizardView> {
        if topic.trim().is_empty() {
            return Err(AppError::InvalidInput("topic must not be blank".to_string()));
        }

        self.store.update(id, |s| s.state.ensure_can_submit())?;
        let _guard = self.store.begin_generation(id)?;

        let questions = self.pipeline.generate_questions(topic).await.inspect_err(|e| {
            tracing::error!(session = %id, error = %e, "Question generation failed");
        })?;

        self.store.update(id, |s| {
            s.state = s.state.submit(topic, questions)?;
            Ok(s.state.view())
        })
    }

    /// `AwaitingAnswers -> AwaitingAnswers` with fresh questions
    pub async fn regenerate(&self, id: Uuid) -> Result<WizardView> {
        let topic = self
            .store
            .update(id, |s| s.state.regenerate_topic().map(str::to_string))?;
        let _guard = self.store.begin_generation(id)?;

        let questions = self.pipeline.generate_questions(&topic).await.inspect_err(|e| {
            tracing::error!(session = %id, error = %e, "Question regeneration failed");
        })?;

        self.store.update(id, |s| {
            s.state = s.state.regenerate(questions)?;
            Ok(s.state.view())
        })
    }

    /// `AwaitingAnswers -> Reporting`
    ///
    /// Returns the report as a stream of events. Every chunk is appended to
    /// the session before it is yielded, so the session view always matches
    /// what the page has rendered.
    pub fn continue_research(&self, id: Uuid, answers: Vec<String>) -> Result<ReportEvents> {
        let count = answers.len();
        let answers: [String; QUESTION_COUNT] = answers.try_into().map_err(|_| {
            AppError::InvalidInput(format!(
                "expected {} answers, got {}",
                QUESTION_COUNT, count
            ))
        })?;

        let token = CancellationToken::new();
        let query = self.store.update(id, |s| {
            if s.busy {
                return Err(AppError::Conflict(
                    "question generation in progress".to_string(),
                ));
            }
            let (next, query) = s.state.begin_report(answers)?;
            s.state = next;
            s.cancel = Some(token.clone());
            Ok(query)
        })?;

        tracing::info!(session = %id, query_len = query.len(), "Research started");

        let updates = Box::pin(
            self.pipeline
                .run_full(query)
                .take_until(token.clone().cancelled_owned()),
        );
        let finalizer = StreamFinalizer {
            store: self.store.clone(),
            id,
            token: token.clone(),
        };

        Ok(Box::pin(async_stream::stream! {
            let guard = finalizer;
            let mut updates = updates;

            while let Some(update) = updates.next().await {
                match update {
                    Ok(ResearchUpdate::Progress(text)) => {
                        let _ = store_update(&guard, |state| state.set_progress(&text));
                        yield ReportEvent::Progress(text);
                    }
                    Ok(ResearchUpdate::Chunk(text)) => {
                        let appended = store_update(&guard, |state| state.append_chunk(&text));
                        if appended != Some(true) {
                            break;
                        }
                        yield ReportEvent::Chunk(text);
                    }
                    Err(e) => {
                        tracing::error!(session = %id, error = %e, "Research failed mid-stream");
                        let notice = format!("Research stopped early: {}", e);
                        store_update(&guard, |state| {
                            state.finish(ReportStatus::Failed, Some(notice.clone()))
                        });
                        yield ReportEvent::Error(notice);
                        return;
                    }
                }
            }

            if token.is_cancelled() {
                tracing::info!(session = %id, "Research cancelled");
                yield ReportEvent::Cancelled;
            } else {
                store_update(&guard, |state| state.finish(ReportStatus::Complete, None));
                tracing::info!(session = %id, "Research complete");
                yield ReportEvent::Done;
            }
        }))
    }

    /// Stop a streaming report, keeping what has arrived
    pub fn cancel(&self, id: Uuid) -> Result<WizardView> {
        self.store.update(id, |s| {
            s.state.cancel()?;
            if let Some(token) = s.cancel.take() {
                token.cancel();
            }
            Ok(s.state.view())
        })
    }

    /// Back to `Initial` from anywhere
    pub fn reset(&self, id: Uuid) -> Result<WizardView> {
        self.store.reset(id)
    }
}

/// Closes the session's report when the event stream goes away
///
/// Covers the client disconnecting mid-report: the stream is dropped, and the
/// report is marked cancelled with its partial content intact. A cancelled
/// token means cancel or reset already settled the session.
struct StreamFinalizer {
    store: Arc<SessionStore>,
    id: Uuid,
    token: CancellationToken,
}

impl Drop for StreamFinalizer {
    fn drop(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        let _ = self.store.update(self.id, |s| {
            s.cancel = None;
            s.state
                .finish(ReportStatus::Cancelled, Some(CANCELLED_NOTICE.to_string()));
            Ok(())
        });
    }
}

fn store_update<R>(
    finalizer: &StreamFinalizer,
    f: impl FnOnce(&mut WizardState) -> R,
) -> Option<R> {
    finalizer
        .store
        .update(finalizer.id, |s| Ok(f(&mut s.state)))
        .ok()
}
