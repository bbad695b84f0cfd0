mod auth;
mod backend;
mod error;
mod store;

pub use auth::{AcceptNonEmpty, AuthError, AuthProvider, Credentials};
pub use backend::{FileBackend, MemoryBackend, SessionBackend};
pub use error::SessionError;
pub use store::{COMMITTED_KEY, DRAFT_KEY, LOGGED_IN_KEY, SessionRecord, SessionStore, USER_KEY};
