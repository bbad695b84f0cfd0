use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::schema::{FieldKind, ValidationSchema, parse_date, parse_number};

/// Value held by a single form field.
///
/// Serialized as JSON `null`, a string, or a number. Dates are written as
/// `YYYY-MM-DD` strings and read back as text, so parsed dates only appear in
/// coerced copies; form state and persisted records hold [`raw`](Self::raw)
/// values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Absent,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl FieldValue {
    /// Absent, or text that is empty once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Number(_) | FieldValue::Date(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The value as typed into a form: dates become their `YYYY-MM-DD` text.
    pub fn raw(self) -> FieldValue {
        match self {
            FieldValue::Date(date) => FieldValue::Text(date.format("%Y-%m-%d").to_string()),
            other => other,
        }
    }

    /// Parses raw text according to `kind`; anything that does not parse is
    /// returned unchanged.
    pub fn coerce(&self, kind: FieldKind) -> FieldValue {
        match (kind, self) {
            (_, FieldValue::Text(raw)) if raw.trim().is_empty() => FieldValue::Absent,
            (FieldKind::Number, FieldValue::Text(raw)) => parse_number(raw)
                .map(FieldValue::Number)
                .unwrap_or_else(|| self.clone()),
            (FieldKind::Date, FieldValue::Text(raw)) => parse_date(raw)
                .map(FieldValue::Date)
                .unwrap_or_else(|| self.clone()),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => Ok(()),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Absent => serializer.serialize_none(),
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Number(number) => serializer.serialize_f64(*number),
            FieldValue::Date(date) => {
                serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<Stored>::deserialize(deserializer)? {
            None => FieldValue::Absent,
            Some(Stored::Number(number)) => FieldValue::Number(number),
            Some(Stored::Text(text)) => FieldValue::Text(text),
        })
    }
}

/// The complete set of field values of one form instance, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    values: IndexMap<String, FieldValue>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Text of `field`, when it holds raw text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys that `schema` does not declare.
    pub fn unknown_keys(&self, schema: &ValidationSchema) -> Vec<String> {
        self.values
            .keys()
            .filter(|key| !schema.contains(key))
            .cloned()
            .collect()
    }

    /// Copy with raw text parsed into numbers and dates per field kind.
    /// Keys the schema does not declare are kept unchanged.
    pub fn coerce(&self, schema: &ValidationSchema) -> FormSnapshot {
        self.values
            .iter()
            .map(|(field, value)| {
                let coerced = match schema.field(field) {
                    Some(spec) => value.coerce(spec.kind),
                    None => value.clone(),
                };
                (field.clone(), coerced)
            })
            .collect()
    }

    /// Copy holding only raw values; survives a JSON round trip unchanged.
    pub fn to_raw(&self) -> FormSnapshot {
        self.values
            .iter()
            .map(|(field, value)| (field.clone(), value.clone().raw()))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl<K, V> FromIterator<(K, V)> for FormSnapshot
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}
