use std::sync::Arc;

use crate::session::{AcceptNonEmpty, AuthProvider};

#[derive(Debug, Clone)]
pub struct DeskOptions {
    /// Load the saved draft whenever the invoice screen is entered.
    pub restore_draft: bool,
    /// Initial state of the "Expense Details" block.
    pub expense_details: bool,
    /// Extra bypass patterns appended to the guard defaults.
    pub bypass_patterns: Vec<String>,
    pub(crate) auth: Arc<dyn AuthProvider>,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            restore_draft: false,
            expense_details: true,
            bypass_patterns: Vec::new(),
            auth: Arc::new(AcceptNonEmpty),
        }
    }
}

impl DeskOptions {
    pub fn with_restore_draft(mut self, enabled: bool) -> Self {
        self.restore_draft = enabled;
        self
    }

    pub fn with_expense_details(mut self, visible: bool) -> Self {
        self.expense_details = visible;
        self
    }

    pub fn with_bypass_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.bypass_patterns.push(pattern.into());
        self
    }

    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Arc::new(provider);
        self
    }

    pub fn auth_provider(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }
}
