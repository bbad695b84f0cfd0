use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use crate::{
    schema::ValidationSchema,
    session::{SessionBackend, SessionStore},
};

use super::DocumentFormat;

/// Destination for serialized output values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    /// `-` means stdout, anything else a file path.
    pub fn parse(spec: &str) -> Self {
        if spec == "-" {
            OutputDestination::Stdout
        } else {
            OutputDestination::file(spec)
        }
    }
}

impl fmt::Display for OutputDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputDestination::Stdout => f.write_str("stdout"),
            OutputDestination::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Which persisted snapshot to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Draft,
    Committed,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Draft => "draft",
            RecordKind::Committed => "committed invoice",
        }
    }
}

/// Writes a persisted record as a typed document.
///
/// Committed records are checked against the schema's JSON Schema document
/// first; drafts are exported as they are.
pub fn export_record<B: SessionBackend>(
    session: &SessionStore<B>,
    schema: &ValidationSchema,
    kind: RecordKind,
    options: &OutputOptions,
) -> Result<Value> {
    let snapshot = match kind {
        RecordKind::Draft => session.draft(),
        RecordKind::Committed => session.committed(),
    }
    .with_context(|| format!("failed to read the {}", kind.label()))?
    .ok_or_else(|| anyhow!("no {} has been saved", kind.label()))?;

    let document = schema.typed_document(&snapshot.coerce(schema));
    if kind == RecordKind::Committed
        && let Err(issues) = schema.check_document(&document)
    {
        bail!(
            "committed invoice does not match its schema:\n{}",
            issues.join("\n")
        );
    }
    emit(&document, options)?;
    Ok(document)
}

/// Renders `value` once and writes it to every configured destination.
pub fn emit(value: &Value, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let payload = options.format.render(value, options.pretty)?;
    for destination in &options.destinations {
        write_payload(destination, &payload)
            .with_context(|| format!("failed to write to {destination}"))?;
    }
    Ok(())
}

fn write_payload(destination: &OutputDestination, payload: &str) -> io::Result<()> {
    match destination {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{payload}")?;
            stdout.flush()
        }
        OutputDestination::File(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{payload}\n"))
        }
    }
}
