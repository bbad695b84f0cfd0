use std::{fmt, path::Path, str::FromStr};

use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Formats a record can be exported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
}

impl DocumentFormat {
    /// Guess the format from a file extension; `None` when unknown or not compiled in.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }

    /// Serializes `value`. YAML has no compact form, so `pretty` only
    /// affects JSON and TOML.
    pub fn render(self, value: &Value, pretty: bool) -> Result<String> {
        let rendered: Result<String> = match self {
            DocumentFormat::Json if pretty => {
                serde_json::to_string_pretty(value).map_err(Into::into)
            }
            DocumentFormat::Json => serde_json::to_string(value).map_err(Into::into),
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(Into::into),
            #[cfg(feature = "toml")]
            DocumentFormat::Toml if pretty => toml::to_string_pretty(value).map_err(Into::into),
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => toml::to_string(value).map_err(Into::into),
        };
        rendered.with_context(|| format!("failed to serialize {self} document"))
    }
}

impl FromStr for DocumentFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            #[cfg(feature = "toml")]
            "toml" => Ok(DocumentFormat::Toml),
            other => bail!("unsupported export format '{other}'"),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "json"),
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => write!(f, "yaml"),
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => write!(f, "toml"),
        }
    }
}
