use super::state::{WizardState, WizardView};
use crate::types::{AppError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One browser tab's wizard
#[derive(Debug)]
pub struct Session {
    pub state: WizardState,
    /// Set while question generation is in flight
    pub busy: bool,
    /// Present while a report streams
    pub cancel: Option<CancellationToken>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            state: WizardState::Initial,
            busy: false,
            cancel: None,
            created_at: now,
            last_active: now,
        }
    }

    fn stop_stream(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

/// In-memory session table
///
/// Closures passed to [`SessionStore::update`] run under the write lock and
/// must not block.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> (Uuid, WizardView) {
        let id = Uuid::new_v4();
        let session = Session::new();
        let view = session.state.view();
        self.sessions.write().insert(id, session);
        (id, view)
    }

    pub fn view(&self, id: Uuid) -> Result<WizardView> {
        self.sessions
            .read()
            .get(&id)
            .map(|s| s.state.view())
            .ok_or_else(|| not_found(id))
    }

    /// Run `f` against a session, refreshing its activity timestamp
    pub fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> Result<R>) -> Result<R> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.last_active = Utc::now();
        f(session)
    }

    pub fn remove(&self, id: Uuid) -> Result<()> {
        let mut session = self
            .sessions
            .write()
            .remove(&id)
            .ok_or_else(|| not_found(id))?;
        session.stop_stream();
        Ok(())
    }

    /// Drop sessions idle for longer than `max_idle`
    pub fn purge_expired(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| {
            let keep = s.last_active > cutoff;
            if !keep {
                s.stop_stream();
            }
            keep
        });
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark a session busy until the returned guard drops
    pub fn begin_generation(self: &Arc<Self>, id: Uuid) -> Result<GenerationGuard> {
        self.update(id, |session| {
            if session.busy {
                return Err(AppError::Conflict(
                    "question generation already in progress".to_string(),
                ));
            }
            session.busy = true;
            Ok(())
        })?;

        Ok(GenerationGuard {
            store: Arc::clone(self),
            id,
        })
    }

    /// Cancel any stream and return to `Initial`
    pub fn reset(&self, id: Uuid) -> Result<WizardView> {
        self.update(id, |session| {
            session.stop_stream();
            session.state = session.state.reset();
            Ok(session.state.view())
        })
    }
}

/// Clears the busy flag on drop, including when the request is abandoned
pub struct GenerationGuard {
    store: Arc<SessionStore>,
    id: Uuid,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        if let Some(session) = self.store.sessions.write().get_mut(&self.id) {
            session.busy = false;
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("session {}", id))
}
