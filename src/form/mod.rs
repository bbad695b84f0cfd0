mod error;
mod section;
mod snapshot;
mod state;

pub use error::{ErrorKind, FormError};
pub use section::SectionController;
pub use snapshot::{FieldValue, FormSnapshot};
pub use state::FormStateMachine;
