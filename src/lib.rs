#![deny(rust_2018_idioms)]

pub mod app;
pub mod form;
pub mod io;
pub mod route;
pub mod schema;
pub mod session;

#[cfg(test)]
mod tests;

pub use app::{DeskError, DeskOptions, InvoiceDesk, Landing, LoginOutcome, SubmitOutcome};
pub use form::{FieldValue, FormError, FormSnapshot, FormStateMachine, SectionController};
pub use route::{Navigation, RouteGuard, Screen};
pub use schema::{FieldKind, FieldSpec, ValidationResult, ValidationSchema, validate};
pub use session::{FileBackend, MemoryBackend, SessionBackend, SessionRecord, SessionStore};

pub mod prelude {
    pub use super::{
        DeskOptions, FieldValue, FormSnapshot, FormStateMachine, InvoiceDesk, RouteGuard,
        SectionController, SessionStore, ValidationSchema,
    };
}
