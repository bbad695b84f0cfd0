mod builtin;
mod document;
mod error;
mod loader;
mod validate;

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::form::FormSnapshot;

pub use builtin::{
    EXPENSE_SUBGROUP, invoice_schema, invoice_schema_document, login_schema,
    login_schema_document,
};
pub use error::SchemaError;
pub use loader::parse_validation_schema;
pub use validate::{ValidationResult, parse_date, parse_number, validate};

pub(crate) use document::CompiledDocument;

/// Value type a field is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
        }
    }
}

/// A selectable option for choice-backed text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChoice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub title: String,
    pub kind: FieldKind,
    pub required: bool,
    pub error_message: String,
    pub type_message: Option<String>,
    pub default: Option<String>,
    pub choices: Vec<FieldChoice>,
    pub subgroup: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            title: prettify_label(&name),
            name,
            kind,
            required: false,
            error_message: String::new(),
            type_message: None,
            default: None,
            choices: Vec::new(),
            subgroup: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.error_message = message.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_choice(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices.push(FieldChoice {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    pub fn in_subgroup(mut self, group: impl Into<String>) -> Self {
        self.subgroup = Some(group.into());
        self
    }

    /// Message reported when a present value cannot be parsed as `kind`.
    pub fn type_error(&self) -> String {
        if let Some(message) = &self.type_message {
            return message.clone();
        }
        match self.kind {
            FieldKind::Text => format!("{} is invalid", self.title),
            FieldKind::Number => format!("{} must be a number", self.title),
            FieldKind::Date => format!("{} must be a valid date (YYYY-MM-DD)", self.title),
        }
    }

    pub fn choice_label(&self, value: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.value == value)
            .map(|choice| choice.label.as_str())
    }
}

/// A tab of the form: an ordered list of field names shown together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub id: String,
    pub title: String,
    pub ordinal: usize,
    pub fields: Vec<String>,
}

impl SectionSpec {
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|name| name == field)
    }
}

/// Declarative set of field constraints plus the section layout over them.
#[derive(Debug, Clone)]
pub struct ValidationSchema {
    title: Option<String>,
    fields: IndexMap<String, FieldSpec>,
    sections: Vec<SectionSpec>,
    document: Option<CompiledDocument>,
}

impl ValidationSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn has_subgroup(&self, group: &str) -> bool {
        self.fields
            .values()
            .any(|spec| spec.subgroup.as_deref() == Some(group))
    }

    pub fn validate(&self, snapshot: &FormSnapshot) -> ValidationResult {
        validate(self, snapshot)
    }

    /// Snapshot holding every field at its declared default, or absent.
    pub fn initial_snapshot(&self) -> FormSnapshot {
        self.fields
            .values()
            .map(|spec| {
                let value = match &spec.default {
                    Some(default) => crate::form::FieldValue::Text(default.clone()),
                    None => crate::form::FieldValue::Absent,
                };
                (spec.name.clone(), value)
            })
            .collect()
    }

    pub(crate) fn with_document(mut self, document: CompiledDocument) -> Self {
        self.document = Some(document);
        self
    }

    pub(crate) fn document(&self) -> Option<&CompiledDocument> {
        self.document.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    title: Option<String>,
    fields: Vec<FieldSpec>,
    sections: Vec<(String, String, Vec<String>)>,
}

impl SchemaBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn section<I, S>(mut self, id: impl Into<String>, title: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push((
            id.into(),
            title.into(),
            fields.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Checks the schema invariants and freezes the field order.
    ///
    /// Without any declared section every field lands in a single `general` section.
    pub fn build(self) -> Result<ValidationSchema, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for spec in self.fields {
            if spec.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if spec.required && spec.error_message.trim().is_empty() {
                return Err(SchemaError::MissingErrorMessage(spec.name));
            }
            if fields.contains_key(&spec.name) {
                return Err(SchemaError::DuplicateField(spec.name));
            }
            fields.insert(spec.name.clone(), spec);
        }

        let mut declared = self.sections;
        if declared.is_empty() {
            declared.push((
                "general".to_string(),
                "General".to_string(),
                fields.keys().cloned().collect(),
            ));
        }

        let mut seen = HashSet::new();
        let mut sections = Vec::with_capacity(declared.len());
        for (ordinal, (id, title, names)) in declared.into_iter().enumerate() {
            if !seen.insert(id.clone()) {
                return Err(SchemaError::DuplicateSection(id));
            }
            if let Some(missing) = names.iter().find(|name| !fields.contains_key(*name)) {
                return Err(SchemaError::UnknownSectionField {
                    section: id,
                    field: missing.clone(),
                });
            }
            sections.push(SectionSpec {
                id,
                title,
                ordinal,
                fields: names,
            });
        }

        Ok(ValidationSchema {
            title: self.title,
            fields,
            sections,
            document: None,
        })
    }
}

pub(crate) fn prettify_label(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(raw.len() + 4);
    let mut capitalize = true;
    let mut previous_lower = false;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            result.push(' ');
            capitalize = true;
            previous_lower = false;
            continue;
        }

        if ch.is_ascii_uppercase() && previous_lower {
            result.push(' ');
        }

        if capitalize {
            result.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            result.push(ch);
        }
        previous_lower = ch.is_ascii_lowercase();
    }

    result.trim().to_string()
}
