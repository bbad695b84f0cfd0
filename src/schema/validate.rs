use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

use crate::form::{FieldValue, FormSnapshot};

use super::{FieldKind, FieldSpec, ValidationSchema};

/// Field name to error message, for failing fields only, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: IndexMap<String, String>,
}

impl ValidationResult {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Keeps only the entries whose field satisfies `keep`.
    pub fn retain_fields(&self, mut keep: impl FnMut(&str) -> bool) -> ValidationResult {
        ValidationResult {
            errors: self
                .errors
                .iter()
                .filter(|(field, _)| keep(field))
                .map(|(field, message)| (field.clone(), message.clone()))
                .collect(),
        }
    }
}

/// Checks every field of `schema` against `snapshot`.
///
/// Total and side-effect free: keys of `snapshot` that the schema does not
/// declare are ignored, and a missing key counts as an absent value.
pub fn validate(schema: &ValidationSchema, snapshot: &FormSnapshot) -> ValidationResult {
    let mut errors = IndexMap::new();
    for spec in schema.fields() {
        let value = snapshot.get(&spec.name).unwrap_or(&FieldValue::Absent);
        if let Some(message) = check_field(spec, value) {
            errors.insert(spec.name.clone(), message);
        }
    }
    ValidationResult { errors }
}

fn check_field(spec: &FieldSpec, value: &FieldValue) -> Option<String> {
    if value.is_blank() {
        return spec.required.then(|| spec.error_message.clone());
    }

    let well_typed = match (spec.kind, value) {
        (FieldKind::Text, _) => true,
        (FieldKind::Number, FieldValue::Number(number)) => number.is_finite(),
        (FieldKind::Number, FieldValue::Text(raw)) => parse_number(raw).is_some(),
        (FieldKind::Date, FieldValue::Date(_)) => true,
        (FieldKind::Date, FieldValue::Text(raw)) => parse_date(raw).is_some(),
        (FieldKind::Number, FieldValue::Date(_)) | (FieldKind::Date, FieldValue::Number(_)) => {
            false
        }
        (_, FieldValue::Absent) => true,
    };

    (!well_typed).then(|| spec.type_error())
}

/// Parses a decimal number the way a numeric input would accept it.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a calendar date: `YYYY-MM-DD`, an RFC 3339 timestamp, or a
/// `YYYY-MM-DDTHH:MM[:SS]` local timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|timestamp| timestamp.date())
}
