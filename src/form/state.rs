use std::sync::Arc;

use indexmap::IndexSet;

use crate::schema::{ValidationResult, ValidationSchema};

use super::{
    error::FormError,
    snapshot::{FieldValue, FormSnapshot},
};

/// Field values of one form plus per-field touched tracking.
///
/// The machine only ever sits in an editing state. Whether the form may be
/// submitted is derived from the current snapshot on every call and never
/// cached, so [`is_submittable`](Self::is_submittable) and
/// [`current_errors`](Self::current_errors) cannot disagree.
#[derive(Debug, Clone)]
pub struct FormStateMachine {
    schema: Arc<ValidationSchema>,
    initial: FormSnapshot,
    snapshot: FormSnapshot,
    touched: IndexSet<String>,
}

impl FormStateMachine {
    pub fn new(schema: Arc<ValidationSchema>) -> Self {
        let initial = schema.initial_snapshot();
        Self {
            snapshot: initial.clone(),
            initial,
            schema,
            touched: IndexSet::new(),
        }
    }

    pub fn schema(&self) -> &Arc<ValidationSchema> {
        &self.schema
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.snapshot.get(name)
    }

    /// Stores `raw` as the text of `name` and marks the field touched.
    pub fn set_field(
        &mut self,
        name: &str,
        raw: impl Into<String>,
    ) -> Result<&FormSnapshot, FormError> {
        self.set_value(name, FieldValue::Text(raw.into()))
    }

    /// Stores `value` as typed input; a parsed date is kept as its text.
    pub fn set_value(
        &mut self,
        name: &str,
        value: FieldValue,
    ) -> Result<&FormSnapshot, FormError> {
        self.ensure_known(name)?;
        tracing::debug!(field = name, "field edited");
        self.snapshot.insert(name, value.raw());
        self.touched.insert(name.to_string());
        Ok(&self.snapshot)
    }

    pub fn clear_field(&mut self, name: &str) -> Result<&FormSnapshot, FormError> {
        self.set_value(name, FieldValue::Absent)
    }

    /// Marks `name` touched without changing its value, as on blur.
    pub fn touch(&mut self, name: &str) -> Result<(), FormError> {
        self.ensure_known(name)?;
        self.touched.insert(name.to_string());
        Ok(())
    }

    pub fn touch_all(&mut self) {
        for name in self.schema.field_names() {
            self.touched.insert(name.to_string());
        }
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Replaces the whole snapshot. Declared fields missing from `values`
    /// become absent, parsed dates become text and touched state is cleared.
    pub fn load_snapshot(&mut self, values: FormSnapshot) -> Result<(), FormError> {
        let unknown = values.unknown_keys(&self.schema);
        if !unknown.is_empty() {
            return Err(FormError::UnknownKeys(unknown));
        }
        self.snapshot = self
            .schema
            .field_names()
            .map(|name| {
                let value = values.get(name).cloned().unwrap_or_default();
                (name.to_string(), value.raw())
            })
            .collect();
        self.touched.clear();
        Ok(())
    }

    /// Restores the defaults the form was opened with.
    pub fn reset(&mut self) {
        self.snapshot = self.initial.clone();
        self.touched.clear();
    }

    pub fn current_errors(&self) -> ValidationResult {
        self.schema.validate(&self.snapshot)
    }

    /// Errors of touched fields only; what an inline renderer shows.
    pub fn visible_errors(&self) -> ValidationResult {
        self.current_errors()
            .retain_fields(|field| self.touched.contains(field))
    }

    pub fn field_error(&self, name: &str) -> Option<String> {
        self.current_errors().get(name).map(str::to_string)
    }

    pub fn is_submittable(&self) -> bool {
        self.current_errors().is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.snapshot != self.initial
    }

    pub fn is_field_dirty(&self, name: &str) -> bool {
        self.snapshot.get(name) != self.initial.get(name)
    }

    /// The snapshot, released only while the submit gate is open.
    pub fn submit_values(&self) -> Result<FormSnapshot, FormError> {
        let errors = self.current_errors();
        if errors.is_empty() {
            Ok(self.snapshot.clone())
        } else {
            Err(FormError::NotSubmittable(errors))
        }
    }

    fn ensure_known(&self, name: &str) -> Result<(), FormError> {
        if self.schema.contains(name) {
            Ok(())
        } else {
            Err(FormError::UnknownField(name.to_string()))
        }
    }
}
