mod desk;
mod options;
mod status;
mod upload;

pub use desk::{DeskError, InvoiceDesk, Landing, LoginOutcome, SubmitOutcome};
pub use options::DeskOptions;
pub use status::{READY_STATUS, StatusLine};
pub use upload::{FileHandle, SelectedFile, UploadSlot};
