use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field names must not be empty")]
    EmptyName,

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("required field '{0}' has no error message")]
    MissingErrorMessage(String),

    #[error("section '{0}' is declared more than once")]
    DuplicateSection(String),

    #[error("section '{section}' references unknown field '{field}'")]
    UnknownSectionField { section: String, field: String },
}
