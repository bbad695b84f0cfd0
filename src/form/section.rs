use std::{collections::HashSet, sync::Arc};

use crate::schema::{FieldSpec, SectionSpec, ValidationResult, ValidationSchema};

use super::error::FormError;

/// Tracks which section of a form is on screen.
///
/// Switching sections never touches field values or validation: errors of
/// fields outside the active section are hidden from
/// [`visible_errors`](Self::visible_errors) but still count against the
/// form's submit gate.
#[derive(Debug, Clone)]
pub struct SectionController {
    schema: Arc<ValidationSchema>,
    active: usize,
    collapsed: HashSet<String>,
}

impl SectionController {
    pub fn new(schema: Arc<ValidationSchema>) -> Self {
        Self {
            schema,
            active: 0,
            collapsed: HashSet::new(),
        }
    }

    pub fn sections(&self) -> &[SectionSpec] {
        self.schema.sections()
    }

    pub fn active(&self) -> Option<&SectionSpec> {
        self.schema.sections().get(self.active)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active().map(|section| section.id.as_str())
    }

    pub fn activate(&mut self, id: &str) -> Result<&SectionSpec, FormError> {
        let index = self
            .schema
            .sections()
            .iter()
            .position(|section| section.id == id)
            .ok_or_else(|| FormError::UnknownSection(id.to_string()))?;
        if index != self.active {
            tracing::debug!(section = id, "section activated");
        }
        self.active = index;
        Ok(&self.schema.sections()[index])
    }

    /// Moves `delta` sections forward (or back), wrapping at both ends.
    pub fn focus_next(&mut self, delta: i32) -> Option<&SectionSpec> {
        let len = self.schema.sections().len() as i64;
        if len == 0 {
            return None;
        }
        self.active = (self.active as i64 + i64::from(delta)).rem_euclid(len) as usize;
        self.active()
    }

    pub fn set_subgroup_visible(&mut self, group: &str, visible: bool) -> Result<(), FormError> {
        if !self.schema.has_subgroup(group) {
            return Err(FormError::UnknownSubgroup(group.to_string()));
        }
        if visible {
            self.collapsed.remove(group);
        } else {
            self.collapsed.insert(group.to_string());
        }
        Ok(())
    }

    /// Flips a subgroup and returns whether it is now visible.
    pub fn toggle_subgroup(&mut self, group: &str) -> Result<bool, FormError> {
        let visible = !self.is_subgroup_visible(group);
        self.set_subgroup_visible(group, visible)?;
        Ok(visible)
    }

    pub fn is_subgroup_visible(&self, group: &str) -> bool {
        !self.collapsed.contains(group)
    }

    /// Fields of the active section, minus collapsed subgroups.
    pub fn visible_fields(&self) -> Vec<&FieldSpec> {
        let Some(section) = self.active() else {
            return Vec::new();
        };
        section
            .fields
            .iter()
            .filter_map(|name| self.schema.field(name))
            .filter(|spec| self.spec_visible(spec))
            .collect()
    }

    pub fn is_visible(&self, field: &str) -> bool {
        let in_active = self
            .active()
            .is_some_and(|section| section.contains(field));
        in_active
            && self
                .schema
                .field(field)
                .is_some_and(|spec| self.spec_visible(spec))
    }

    pub fn visible_errors(&self, errors: &ValidationResult) -> ValidationResult {
        errors.retain_fields(|field| self.is_visible(field))
    }

    /// Errors that block submission but are not on screen.
    pub fn hidden_error_count(&self, errors: &ValidationResult) -> usize {
        errors.fields().filter(|field| !self.is_visible(field)).count()
    }

    /// Ids of sections holding at least one failing field.
    pub fn sections_with_errors(&self, errors: &ValidationResult) -> Vec<&str> {
        self.schema
            .sections()
            .iter()
            .filter(|section| section.fields.iter().any(|field| errors.contains(field)))
            .map(|section| section.id.as_str())
            .collect()
    }

    fn spec_visible(&self, spec: &FieldSpec) -> bool {
        spec.subgroup
            .as_deref()
            .is_none_or(|group| self.is_subgroup_visible(group))
    }
}
