// ── Server-side operations ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Operation name of the carving job.
pub const FILE_RECOVERY: &str = "file_recovery";
/// Operation name the service uses for image uploads.
pub const FILE_UPLOAD: &str = "file_upload";

/// Lifecycle status the service reports for a named operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationStatus {
    Idle,
    Uploading,
    Running,
    Completed,
    Error,
    /// A status string this client does not recognize.
    Unknown,
}

impl OperationStatus {
    /// Parse a wire status, mapping anything unexpected to `Unknown`.
    pub fn from_wire(status: &str) -> Self {
        status.parse().unwrap_or(Self::Unknown)
    }

    /// `completed` and `error` end a job; every other status keeps polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Snapshot of one named operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub status: OperationStatus,
    /// Whole-number percentage in `0..=100`.
    pub progress: u8,
    pub message: String,
}

impl Operation {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Clamp a raw server percentage into `0..=100`.
///
/// NaN counts as no progress.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
pub fn clamp_progress(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_statuses_parse() {
        assert_eq!(OperationStatus::from_wire("running"), OperationStatus::Running);
        assert_eq!(OperationStatus::from_wire("completed"), OperationStatus::Completed);
        assert_eq!(OperationStatus::from_wire("error"), OperationStatus::Error);
        assert_eq!(OperationStatus::from_wire("paused"), OperationStatus::Unknown);
    }

    #[test]
    fn only_completed_and_error_are_terminal() {
        assert!(OperationStatus::Completed.is_terminal());
        assert!(OperationStatus::Error.is_terminal());
        assert!(!OperationStatus::Running.is_terminal());
        assert!(!OperationStatus::Idle.is_terminal());
        assert!(!OperationStatus::Unknown.is_terminal());
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(clamp_progress(42.0), 42);
        assert_eq!(clamp_progress(42.6), 43);
        assert_eq!(clamp_progress(-5.0), 0);
        assert_eq!(clamp_progress(250.0), 100);
        assert_eq!(clamp_progress(f64::NAN), 0);
    }
}
