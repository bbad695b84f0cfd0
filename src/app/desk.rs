use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;

use crate::{
    form::{FormError, FormSnapshot, FormStateMachine, SectionController},
    route::{Navigation, RouteGuard, Screen},
    schema::{
        EXPENSE_SUBGROUP, SectionSpec, ValidationResult, ValidationSchema, invoice_schema,
        login_schema,
    },
    session::{AuthError, Credentials, MemoryBackend, SessionBackend, SessionError, SessionStore},
};

use super::{
    options::DeskOptions,
    status::StatusLine,
    upload::{FileHandle, SelectedFile, UploadSlot},
};

const USERNAME_FIELD: &str = "username";
const PASSWORD_FIELD: &str = "password";
const LINE_AMOUNT_FIELD: &str = "lineAmount";

#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("the {expected} screen is not mounted")]
    ScreenInactive { expected: Screen },

    #[error("no screen is mounted at '{0}'")]
    UnknownRoute(String),
}

/// Where a navigation request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    Screen(Screen),
    Redirected { requested: String, to: Screen },
    /// Bypassed the guard; no screen was mounted.
    Passthrough(String),
}

impl Landing {
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Landing::Screen(screen) | Landing::Redirected { to: screen, .. } => Some(*screen),
            Landing::Passthrough(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    LoggedIn { actor: String },
    Rejected(ValidationResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The record exactly as persisted. Use
    /// [`FormSnapshot::coerce`] or [`ValidationSchema::typed_document`] for
    /// parsed numbers and dates.
    Committed(FormSnapshot),
    Blocked(ValidationResult),
}

/// The login screen, the invoice form and the confirmation screen wired to
/// one session store.
///
/// Every navigation goes through the route guard first; screen operations
/// fail with [`DeskError::ScreenInactive`] unless their screen is mounted.
#[derive(Debug)]
pub struct InvoiceDesk<B: SessionBackend = MemoryBackend> {
    session: SessionStore<B>,
    guard: RouteGuard,
    options: DeskOptions,
    screen: Option<Screen>,
    login_form: FormStateMachine,
    invoice_form: FormStateMachine,
    sections: SectionController,
    upload: UploadSlot,
    status: StatusLine,
}

impl InvoiceDesk<MemoryBackend> {
    pub fn in_memory(options: DeskOptions) -> anyhow::Result<Self> {
        Self::new(SessionStore::in_memory(), options)
    }
}

impl<B: SessionBackend> InvoiceDesk<B> {
    pub fn new(session: SessionStore<B>, options: DeskOptions) -> anyhow::Result<Self> {
        let invoice = Arc::new(invoice_schema().context("failed to load invoice schema")?);
        let login = Arc::new(login_schema().context("failed to load login schema")?);

        let mut guard = RouteGuard::new();
        for pattern in &options.bypass_patterns {
            guard = guard
                .with_bypass(pattern)
                .with_context(|| format!("invalid bypass pattern '{pattern}'"))?;
        }

        let sections = fresh_sections(&invoice, &options)?;
        Ok(Self {
            session,
            guard,
            login_form: FormStateMachine::new(login),
            invoice_form: FormStateMachine::new(invoice),
            sections,
            options,
            screen: None,
            upload: UploadSlot::default(),
            status: StatusLine::new(),
        })
    }

    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    pub fn session(&self) -> &SessionStore<B> {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn login_form(&self) -> &FormStateMachine {
        &self.login_form
    }

    pub fn invoice_form(&self) -> &FormStateMachine {
        &self.invoice_form
    }

    pub fn invoice_schema(&self) -> &ValidationSchema {
        self.invoice_form.schema()
    }

    pub fn sections(&self) -> &SectionController {
        &self.sections
    }

    pub fn upload(&self) -> Option<&SelectedFile> {
        self.upload.selected()
    }

    pub fn status(&self) -> &str {
        self.status.message()
    }

    /// Runs the guard for `path` and mounts whichever screen it allows.
    pub fn navigate(&mut self, path: &str) -> Result<Landing, DeskError> {
        match self.guard.check_session(path, &self.session) {
            Navigation::Bypass => {
                tracing::debug!(path, "navigation bypassed the guard");
                Ok(Landing::Passthrough(path.to_string()))
            }
            Navigation::Redirect(target) => {
                tracing::info!(requested = path, to = %target, "navigation redirected");
                self.mount(target)?;
                Ok(Landing::Redirected {
                    requested: path.to_string(),
                    to: target,
                })
            }
            Navigation::Proceed => {
                let screen = Screen::from_path(path)
                    .ok_or_else(|| DeskError::UnknownRoute(path.to_string()))?;
                self.mount(screen)?;
                Ok(Landing::Screen(screen))
            }
        }
    }

    /// Submits the login form. Empty credentials come back as field errors.
    pub fn login(&mut self, username: &str, password: &str) -> Result<LoginOutcome, DeskError> {
        self.require(Screen::Login)?;
        self.login_form.set_field(USERNAME_FIELD, username)?;
        self.login_form.set_field(PASSWORD_FIELD, password)?;
        let errors = self.login_form.current_errors();
        if !errors.is_empty() {
            self.status.issues_remaining(errors.len());
            return Ok(LoginOutcome::Rejected(errors));
        }

        let credentials = Credentials::new(username, password);
        let actor = self.options.auth_provider().authenticate(&credentials)?;
        self.session.login(&actor)?;
        self.login_form.reset();
        self.status.welcome(&actor);
        self.navigate(Screen::HOME.path())?;
        Ok(LoginOutcome::LoggedIn { actor })
    }

    /// Edits one invoice field and returns its current error, if any.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<Option<String>, DeskError> {
        self.require(Screen::Invoice)?;
        self.invoice_form.set_field(name, raw)?;
        if let Some(spec) = self.invoice_form.schema().field(name) {
            self.status.value_updated(&spec.title);
        }
        Ok(self.invoice_form.field_error(name))
    }

    pub fn clear_field(&mut self, name: &str) -> Result<(), DeskError> {
        self.require(Screen::Invoice)?;
        self.invoice_form.clear_field(name)?;
        Ok(())
    }

    pub fn activate_section(&mut self, id: &str) -> Result<&SectionSpec, DeskError> {
        self.require(Screen::Invoice)?;
        Ok(self.sections.activate(id)?)
    }

    pub fn next_section(&mut self, delta: i32) -> Result<Option<&SectionSpec>, DeskError> {
        self.require(Screen::Invoice)?;
        Ok(self.sections.focus_next(delta))
    }

    /// Collapses or expands the expense block; its fields stay validated.
    pub fn toggle_expense_details(&mut self) -> Result<bool, DeskError> {
        self.require(Screen::Invoice)?;
        Ok(self.sections.toggle_subgroup(EXPENSE_SUBGROUP)?)
    }

    /// Label shown next to the expense toggle.
    pub fn expense_summary(&self) -> String {
        let line = self
            .invoice_form
            .snapshot()
            .get(LINE_AMOUNT_FIELD)
            .filter(|value| !value.is_blank())
            .map(ToString::to_string)
            .unwrap_or_else(|| "0.00".to_string());
        format!("${line} / $0.00")
    }

    /// Errors of touched fields in the visible part of the active section.
    pub fn visible_errors(&self) -> ValidationResult {
        self.sections
            .visible_errors(&self.invoice_form.visible_errors())
    }

    pub fn hidden_error_count(&self) -> usize {
        self.sections
            .hidden_error_count(&self.invoice_form.current_errors())
    }

    pub fn save_draft(&mut self) -> Result<(), DeskError> {
        self.require(Screen::Invoice)?;
        self.session.save_draft(self.invoice_form.snapshot())?;
        self.status.draft_saved();
        Ok(())
    }

    /// Replaces the form with the saved draft. Returns `false` when none exists.
    pub fn load_draft(&mut self) -> Result<bool, DeskError> {
        self.require(Screen::Invoice)?;
        self.restore_draft()
    }

    pub fn attach_file(&mut self, file: FileHandle) -> Result<SelectedFile, DeskError> {
        self.require(Screen::Invoice)?;
        let selected = self.upload.select(file).clone();
        self.status.file_selected(&selected.name);
        Ok(selected)
    }

    /// Commits the invoice when the form validates, then moves to the
    /// confirmation screen. A closed gate leaves the session untouched.
    pub fn submit(&mut self) -> Result<SubmitOutcome, DeskError> {
        self.require(Screen::Invoice)?;
        self.invoice_form.touch_all();
        let errors = self.invoice_form.current_errors();
        if !errors.is_empty() {
            tracing::warn!(issues = errors.len(), "submit blocked by validation");
            self.status.issues_remaining(errors.len());
            return Ok(SubmitOutcome::Blocked(errors));
        }

        let record = self.invoice_form.submit_values()?;
        self.session.commit(&record)?;
        self.status.submitted();
        self.navigate(Screen::Confirmation.path())?;
        Ok(SubmitOutcome::Committed(record))
    }

    fn mount(&mut self, screen: Screen) -> Result<(), DeskError> {
        let entering = self.screen != Some(screen);
        self.screen = Some(screen);
        if entering && screen == Screen::Invoice {
            self.invoice_form.reset();
            self.sections = fresh_sections(self.invoice_form.schema(), &self.options)?;
            self.upload = UploadSlot::default();
            if self.options.restore_draft {
                self.restore_draft()?;
            }
        }
        Ok(())
    }

    fn restore_draft(&mut self) -> Result<bool, DeskError> {
        match self.session.draft()? {
            Some(draft) => {
                self.invoice_form.load_snapshot(draft)?;
                tracing::info!("draft restored");
                self.status.draft_loaded();
                Ok(true)
            }
            None => {
                self.status.no_draft();
                Ok(false)
            }
        }
    }

    fn require(&self, expected: Screen) -> Result<(), DeskError> {
        if self.screen == Some(expected) {
            Ok(())
        } else {
            Err(DeskError::ScreenInactive { expected })
        }
    }
}

fn fresh_sections(
    schema: &Arc<ValidationSchema>,
    options: &DeskOptions,
) -> Result<SectionController, FormError> {
    let mut sections = SectionController::new(Arc::clone(schema));
    if !options.expense_details && schema.has_subgroup(EXPENSE_SUBGROUP) {
        sections.set_subgroup_visible(EXPENSE_SUBGROUP, false)?;
    }
    Ok(sections)
}
