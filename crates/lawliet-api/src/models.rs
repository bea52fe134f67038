// Wire types for the carving service's JSON API
//
// Every response carries a `success` flag; failures add an `error` string.
// Fields use `#[serde(default)]` liberally because the service only
// guarantees the handful of keys the web client reads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// The outer `{ success, error }` shape shared by every endpoint.
///
/// The payload keys sit next to `success` at the top level, so the body
/// is decoded twice: once as an `Envelope` to learn the outcome, then as
/// the endpoint-specific payload type.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Images ───────────────────────────────────────────────────────────

/// A disk image stored on the server, from `GET /images`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub name: String,
    pub size_human: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Absolute server-side path.
    #[serde(default)]
    pub path: Option<String>,
    /// Modification time as a Unix timestamp (seconds, fractional).
    #[serde(default)]
    pub modified: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImagesPayload {
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// A block device reported by the server's `lsblk` scan, from `GET /devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub path: String,
    /// Human-readable size as reported by `lsblk` (e.g. `"465.8G"`).
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Present and non-empty when the device is mounted.
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `disk` or `part`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DevicesPayload {
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

// ── Recovered files ──────────────────────────────────────────────────

/// One recovered file, from `GET /files`. The format is the key of the
/// group the entry was listed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// Path relative to the server's recovery root; usable with `/download`.
    pub path: String,
    pub size_human: String,
    #[serde(default)]
    pub size: Option<u64>,
    /// Name of the image or device the file was carved from.
    #[serde(default)]
    pub source: Option<String>,
}

/// Recovered files grouped by format, in the order the server lists them.
pub type FileGroups = IndexMap<String, Vec<FileEntry>>;

#[derive(Debug, Deserialize)]
pub(crate) struct FilesPayload {
    #[serde(default)]
    pub files: FileGroups,
}

// ── Operations ───────────────────────────────────────────────────────

/// Raw progress record for a named server operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationEntry {
    /// `idle`, `uploading`, `running`, `completed` or `error`.
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationPayload {
    pub operation: OperationEntry,
}

// ── Mutations ────────────────────────────────────────────────────────

/// Which acquisition source a recovery job reads from.
///
/// Flattened into [`RecoveryRequest`], so exactly one of `image_path` or
/// `device_path` is ever sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverySource {
    ImagePath(String),
    DevicePath(String),
}

/// Body of `POST /recover`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryRequest {
    /// Read buffer in megabytes. Passed through verbatim.
    pub buffer_size: u32,
    #[serde(flatten)]
    pub source: RecoverySource,
}

/// Acknowledgment for a one-shot mutation (`/recover`, `/delete-image`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a completed `POST /upload-image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadOutcome {
    #[serde(default)]
    pub message: Option<String>,
    /// Name the server stored the image under (sanitized).
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Byte counters reported while an upload body is streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub bytes_total: u64,
}

impl UploadProgress {
    /// Whole-number percentage, 0 when the total is unknown.
    pub fn percent(&self) -> u8 {
        if self.bytes_total == 0 {
            return 0;
        }
        let pct = self.bytes_sent.saturating_mul(100) / self.bytes_total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}
