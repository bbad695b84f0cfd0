use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file {} is not a JSON object of strings: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored '{key}' is not a valid form snapshot: {source}")]
    CorruptRecord {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
