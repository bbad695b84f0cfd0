use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;

use super::error::SessionError;

/// String key/value storage behind a [`SessionStore`](super::SessionStore).
///
/// Writes are synchronous: a `get` after a successful `set` returns the
/// written value.
pub trait SessionBackend {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: IndexMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps the entries in a JSON object file, rewritten on every `set`. A
/// failed write leaves both the file and the in-memory entries unchanged.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl FileBackend {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| SessionError::Io {
                path: path.clone(),
                source,
            })?;
            if raw.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|source| SessionError::Format {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            IndexMap::new()
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "session file opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &IndexMap<String, String>) -> Result<(), SessionError> {
        let io_error = |source: std::io::Error| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let payload =
            serde_json::to_string_pretty(entries).map_err(|source| SessionError::Format {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, payload).map_err(io_error)
    }
}

impl SessionBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// The entry only becomes visible once the file has been written.
    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);
        self.flush(&next)?;
        self.entries = next;
        Ok(())
    }
}
