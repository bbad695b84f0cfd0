mod format;
mod output;

pub use format::DocumentFormat;
pub use output::{OutputDestination, OutputOptions, RecordKind, emit, export_record};
