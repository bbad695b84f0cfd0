use thiserror::Error;

use crate::schema::ValidationResult;

/// Broad class of a [`FormError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller referenced something the schema does not declare.
    InvalidInput,
    /// A gated effect was attempted while the gate was closed.
    PreconditionViolation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("snapshot contains unknown fields: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown subgroup '{0}'")]
    UnknownSubgroup(String),

    #[error("form is not submittable: {} issue(s) remaining", .0.len())]
    NotSubmittable(ValidationResult),
}

impl FormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormError::NotSubmittable(_) => ErrorKind::PreconditionViolation,
            FormError::UnknownField(_)
            | FormError::UnknownKeys(_)
            | FormError::UnknownSection(_)
            | FormError::UnknownSubgroup(_) => ErrorKind::InvalidInput,
        }
    }
}
