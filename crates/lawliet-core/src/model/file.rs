// ── Recovered files ──

use serde::{Deserialize, Serialize};

/// A file carved out of an acquisition source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredFile {
    pub name: String,
    /// Server-relative path, usable for downloads.
    pub path: String,
    /// Format group the service listed the file under (`jpeg`, `pdf`, ...).
    pub format: String,
    pub size_human: String,
    pub size_bytes: Option<u64>,
    /// Image or device the file came from, when the service reports it.
    pub source: Option<String>,
}
