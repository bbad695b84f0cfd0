use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde_json::Value;

use super::{CompiledDocument, FieldKind, FieldSpec, ValidationSchema, prettify_label};

const DEFAULT_SECTION: &str = "general";

#[derive(Debug, Clone)]
struct SectionInfo {
    title: String,
    fields: Vec<String>,
}

/// Parse a flat JSON Schema object document into a `ValidationSchema`.
///
/// Besides the standard keywords (`type`, `format`, `required`, `default`,
/// `title`) the loader reads these extensions per property: `x-group`
/// (section id or list of ids), `x-group-title`, `x-subgroup`,
/// `x-error-message`, `x-type-message` and `x-choices`. Choices are
/// presentation data only and never constrain the value.
pub fn parse_validation_schema(schema: &Value) -> Result<ValidationSchema> {
    ensure_object(schema)?;
    let schema_type = read_type(schema).unwrap_or_else(|| "object".to_string());
    if schema_type != "object" {
        bail!("root schema must be an object, found {schema_type}");
    }
    let document = CompiledDocument::compile(schema)?;

    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .context("object schema must define properties")?;
    let required = required_set(schema);

    let mut sections: IndexMap<String, SectionInfo> = IndexMap::new();
    let mut builder = ValidationSchema::builder();
    if let Some(title) = schema.get("title").and_then(Value::as_str) {
        builder = builder.title(title);
    }

    for (name, value) in properties {
        let spec = build_field_spec(value, name, required.contains(name))?;
        for group in read_groups(value) {
            let info = sections.entry(group.clone()).or_insert_with(|| SectionInfo {
                title: prettify_label(&group),
                fields: Vec::new(),
            });
            if let Some(title) = value.get("x-group-title").and_then(Value::as_str) {
                info.title = title.to_string();
            }
            info.fields.push(name.clone());
        }
        builder = builder.field(spec);
    }

    for (id, info) in sections {
        builder = builder.section(id, info.title, info.fields);
    }

    let schema = builder
        .build()
        .context("schema document violates form schema rules")?;
    Ok(schema.with_document(document))
}

fn build_field_spec(value: &Value, name: &str, required: bool) -> Result<FieldSpec> {
    let kind =
        detect_kind(value).with_context(|| format!("unsupported schema for field '{name}'"))?;
    let mut spec = FieldSpec::new(name, kind);
    if let Some(title) = value.get("title").and_then(Value::as_str) {
        spec.title = title.to_string();
    }
    if required {
        let message = value
            .get("x-error-message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} is required", spec.title));
        spec = spec.required(message);
    }
    if let Some(message) = value.get("x-type-message").and_then(Value::as_str) {
        spec = spec.with_type_message(message);
    }
    if let Some(default) = value.get("default").and_then(default_text) {
        spec = spec.with_default(default);
    }
    if let Some(group) = value.get("x-subgroup").and_then(Value::as_str) {
        spec = spec.in_subgroup(group);
    }
    for (value, label) in read_choices(value) {
        spec = spec.with_choice(value, label);
    }
    Ok(spec)
}

fn detect_kind(value: &Value) -> Result<FieldKind> {
    match read_type(value).as_deref() {
        Some("string") | None => match value.get("format").and_then(Value::as_str) {
            Some("date") | Some("date-time") => Ok(FieldKind::Date),
            _ => Ok(FieldKind::Text),
        },
        Some("number") | Some("integer") => Ok(FieldKind::Number),
        Some(other) => bail!("unsupported field type {other}"),
    }
}

fn read_groups(value: &Value) -> Vec<String> {
    match value.get("x-group") {
        Some(Value::String(group)) => vec![group.clone()],
        Some(Value::Array(groups)) => groups
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => vec![DEFAULT_SECTION.to_string()],
    }
}

fn read_choices(value: &Value) -> Vec<(String, String)> {
    let Some(options) = value.get("x-choices").and_then(Value::as_array) else {
        return Vec::new();
    };
    options
        .iter()
        .filter_map(|option| match option {
            Value::Object(entry) => {
                let value = entry.get("value").map(value_to_string)?;
                let label = entry
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.clone());
                Some((value, label))
            }
            other => {
                let value = value_to_string(other);
                Some((value.clone(), value))
            }
        })
        .collect()
}

fn default_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(value_to_string(other)),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_type(value: &Value) -> Option<String> {
    match value.get("type")? {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_lowercase())
            .find(|s| s != "null"),
        _ => None,
    }
}

fn required_set(schema: &Value) -> HashSet<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn ensure_object(value: &Value) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        bail!("schema must be a JSON object")
    }
}
