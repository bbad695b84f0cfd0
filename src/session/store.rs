use crate::form::FormSnapshot;

use super::{
    backend::{MemoryBackend, SessionBackend},
    error::SessionError,
};

pub const LOGGED_IN_KEY: &str = "isLoggedIn";
pub const USER_KEY: &str = "user";
pub const DRAFT_KEY: &str = "draftForm";
pub const COMMITTED_KEY: &str = "invoiceData";

/// Everything a session currently holds, read in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub authenticated: bool,
    pub actor_name: Option<String>,
    pub draft: Option<FormSnapshot>,
    pub committed: Option<FormSnapshot>,
}

/// Typed view over the persisted session keys.
///
/// The store is handed around explicitly; every test or process owns its own.
/// There is no logout: once written, keys are only ever overwritten.
#[derive(Debug, Clone, Default)]
pub struct SessionStore<B = MemoryBackend> {
    backend: B,
}

impl SessionStore<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: SessionBackend> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Marks the session authenticated for `actor`. Logging in again only
    /// replaces the actor name.
    ///
    /// The flag is written last, so a failed write never leaves an
    /// authenticated session behind.
    pub fn login(&mut self, actor: &str) -> Result<(), SessionError> {
        self.backend.set(USER_KEY, actor.to_string())?;
        self.backend.set(LOGGED_IN_KEY, "true".to_string())?;
        tracing::info!(actor, "session opened");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.backend.get(LOGGED_IN_KEY).as_deref() == Some("true")
    }

    pub fn actor_name(&self) -> Option<String> {
        self.backend.get(USER_KEY)
    }

    /// Stores `snapshot` as the draft, unvalidated, replacing any prior draft.
    pub fn save_draft(&mut self, snapshot: &FormSnapshot) -> Result<(), SessionError> {
        self.write_snapshot(DRAFT_KEY, snapshot)?;
        tracing::info!(fields = snapshot.len(), "draft saved");
        Ok(())
    }

    pub fn draft(&self) -> Result<Option<FormSnapshot>, SessionError> {
        self.read_snapshot(DRAFT_KEY)
    }

    /// Stores `snapshot` as the committed record.
    ///
    /// The caller must only pass a snapshot whose validation result is empty;
    /// the store does not check it.
    pub fn commit(&mut self, snapshot: &FormSnapshot) -> Result<(), SessionError> {
        self.write_snapshot(COMMITTED_KEY, snapshot)?;
        tracing::info!(fields = snapshot.len(), "record committed");
        Ok(())
    }

    pub fn committed(&self) -> Result<Option<FormSnapshot>, SessionError> {
        self.read_snapshot(COMMITTED_KEY)
    }

    pub fn record(&self) -> Result<SessionRecord, SessionError> {
        Ok(SessionRecord {
            authenticated: self.is_authenticated(),
            actor_name: self.actor_name(),
            draft: self.draft()?,
            committed: self.committed()?,
        })
    }

    fn write_snapshot(
        &mut self,
        key: &'static str,
        snapshot: &FormSnapshot,
    ) -> Result<(), SessionError> {
        let payload = snapshot
            .to_json()
            .map_err(|source| SessionError::Encode { key, source })?;
        self.backend.set(key, payload)
    }

    fn read_snapshot(&self, key: &'static str) -> Result<Option<FormSnapshot>, SessionError> {
        let Some(raw) = self.backend.get(key) else {
            return Ok(None);
        };
        FormSnapshot::from_json(&raw)
            .map(Some)
            .map_err(|source| SessionError::CorruptRecord { key, source })
    }
}
