// ── Domain model ──
//
// Canonical types consumed by the CLI. Wire records from lawliet-api are
// converted into these in `crate::convert`.

pub mod file;
pub mod operation;
pub mod source;

pub use file::RecoveredFile;
pub use operation::{FILE_RECOVERY, FILE_UPLOAD, Operation, OperationStatus};
pub use source::{AcquisitionSource, BlockDevice, SourceMode, StoredImage};
