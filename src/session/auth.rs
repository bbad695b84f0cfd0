use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("username is required")]
    MissingUsername,

    #[error("password is required")]
    MissingPassword,

    #[error("credentials rejected: {0}")]
    Rejected(String),
}

/// Decides whether a credential pair may open a session.
///
/// Returns the actor name recorded in the session on success.
pub trait AuthProvider: fmt::Debug + Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<String, AuthError>;
}

/// Accepts any non-empty username/password pair. There is no real
/// credential check behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptNonEmpty;

impl AuthProvider for AcceptNonEmpty {
    fn authenticate(&self, credentials: &Credentials) -> Result<String, AuthError> {
        if credentials.username.is_empty() {
            return Err(AuthError::MissingUsername);
        }
        if credentials.password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        Ok(credentials.username.clone())
    }
}
