// lawliet-api: Async Rust client for the Lawliet file-carving job service

pub mod client;
pub mod devices;
pub mod error;
pub mod files;
pub mod images;
pub mod models;
pub mod recovery;
pub mod transport;

pub use client::RecoveryClient;
pub use error::Error;
pub use models::{
    Ack, DeviceEntry, FileEntry, FileGroups, ImageEntry, OperationEntry, RecoveryRequest,
    RecoverySource, UploadOutcome, UploadProgress,
};
pub use transport::{TlsMode, TransportConfig};
