use std::path::Path;

/// File handed over by a file picker. The bytes are never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// What the form remembers about the chosen file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: usize,
    /// Whether the extension is one the picker advertises.
    pub accepted: bool,
}

/// Holds the most recently selected invoice document.
#[derive(Debug, Clone)]
pub struct UploadSlot {
    accept: Vec<String>,
    selected: Option<SelectedFile>,
}

impl Default for UploadSlot {
    fn default() -> Self {
        Self::new(["pdf"])
    }
}

impl UploadSlot {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accept: extensions
                .into_iter()
                .map(|ext| ext.into().to_ascii_lowercase())
                .collect(),
            selected: None,
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.accept.iter().any(|allowed| *allowed == ext)
            })
    }

    /// Records `file` as the current selection, replacing any earlier one.
    pub fn select(&mut self, file: FileHandle) -> &SelectedFile {
        let accepted = self.accepts(&file.name);
        if !accepted {
            tracing::warn!(file = %file.name, "selected file does not match the accepted types");
        }
        self.selected.insert(SelectedFile {
            size: file.bytes.len(),
            name: file.name,
            accepted,
        })
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }
}
