//! Client-side orchestration for a file-carving recovery service.
//!
//! Sits between `lawliet-api` and the CLI:
//!
//! - **[`Controller`]**: Facade owning the HTTP client and every piece
//!   of client state. Refreshes listings, uploads and deletes images,
//!   submits jobs, downloads recovered files.
//!
//! - **[`ProgressPoller`]**: Keyed registry of periodic progress polls,
//!   at most one per operation name, each feeding a reducer closure.
//!
//! - **[`RecoveryJob`]**: Validates a submission, starts the job, and
//!   tracks it to a terminal status exactly once.
//!
//! - **[`SourceSelection`]**: Pure state machine for choosing an image,
//!   a discovered device, or a manual device path.
//!
//! - **[`Catalog`]**: Recovered-file listing with type and source
//!   filters and a reactive filtered view.
//!
//! - **[`Notifier`]** / **[`UploadTracker`]**: Transient user messages
//!   and byte-level upload progress.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod job;
pub mod model;
pub mod notify;
pub mod poller;
pub mod selection;
pub mod stream;
pub mod upload;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Catalog, CatalogView, Filter, FilterState};
pub use config::{ClientConfig, TlsVerification};
pub use controller::Controller;
pub use error::{CoreError, MAX_BUFFER_SIZE_MB, MIN_BUFFER_SIZE_MB, ValidationError};
pub use job::{JobAck, JobPhase, JobState, RecoveryJob};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use poller::ProgressPoller;
pub use selection::SourceSelection;
pub use stream::StateStream;
pub use upload::{UploadPhase, UploadState, UploadTracker};

pub use model::{
    AcquisitionSource, BlockDevice, FILE_RECOVERY, FILE_UPLOAD, Operation, OperationStatus,
    RecoveredFile, SourceMode, StoredImage,
};
