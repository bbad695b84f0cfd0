use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use jsonschema::{Validator, validator_for};
use serde_json::{Map, Number, Value};

use crate::form::{FieldValue, FormSnapshot};

use super::ValidationSchema;

/// The JSON Schema document a `ValidationSchema` was loaded from, compiled.
#[derive(Clone)]
pub(crate) struct CompiledDocument {
    source: Arc<Value>,
    validator: Arc<Validator>,
}

impl CompiledDocument {
    pub(crate) fn compile(schema: &Value) -> Result<Self> {
        let validator = validator_for(schema).context("failed to compile JSON schema")?;
        Ok(Self {
            source: Arc::new(schema.clone()),
            validator: Arc::new(validator),
        })
    }

    pub(crate) fn source(&self) -> &Value {
        &self.source
    }
}

impl fmt::Debug for CompiledDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledDocument")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl ValidationSchema {
    /// Renders `snapshot` as a typed JSON object: numbers and dates are
    /// parsed per field kind and absent fields are omitted.
    pub fn typed_document(&self, snapshot: &FormSnapshot) -> Value {
        let mut object = Map::new();
        for spec in self.fields() {
            let Some(value) = snapshot.get(&spec.name) else {
                continue;
            };
            let typed = match value.coerce(spec.kind) {
                FieldValue::Absent => continue,
                FieldValue::Text(text) => Value::String(text),
                FieldValue::Number(number) => Number::from_f64(number)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                FieldValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            };
            object.insert(spec.name.clone(), typed);
        }
        Value::Object(object)
    }

    /// Checks a typed document against the JSON Schema this schema was loaded
    /// from. Schemas assembled with the builder accept every document.
    pub fn check_document(&self, document: &Value) -> Result<(), Vec<String>> {
        let Some(compiled) = self.document() else {
            return Ok(());
        };
        let issues: Vec<String> = compiled
            .validator
            .iter_errors(document)
            .map(|error| {
                let pointer = error.instance_path.to_string();
                let prefix = if pointer.is_empty() {
                    "<root>".to_string()
                } else {
                    pointer
                };
                format!("{prefix}: {error}")
            })
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// The JSON Schema document this schema was parsed from, if any.
    pub fn source_document(&self) -> Option<&Value> {
        self.document().map(CompiledDocument::source)
    }
}
