// ── Core error types ──
//
// User-facing errors from lawliet-core. Consumers never see reqwest
// errors or JSON parse failures directly; `From<lawliet_api::Error>`
// folds them into the variants below. Validation failures are their
// own enum because they are raised before any request is made.

use thiserror::Error;

/// Lower bound for the carving read buffer, in megabytes.
pub const MIN_BUFFER_SIZE_MB: u32 = 1;
/// Upper bound for the carving read buffer, in megabytes.
pub const MAX_BUFFER_SIZE_MB: u32 = 1024;

/// Rejections raised locally, before anything is sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "buffer size range: {value} MB is outside {MIN_BUFFER_SIZE_MB}..={MAX_BUFFER_SIZE_MB} MB"
    )]
    BufferSizeRange { value: u32 },

    #[error("no source selected")]
    NoSourceSelected,

    #[error("device {path} is mounted at {mountpoint}; unmount it before carving")]
    MountedDevice { path: String, mountpoint: String },

    #[error("device {path} was not found in the last device scan")]
    UnknownDevice { path: String },

    #[error("a recovery job is already being tracked")]
    JobInFlight,

    #[error("an upload is already in progress")]
    UploadInFlight,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local rejections ─────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach carving service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Carving service timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Malformed response from carving service: {message}")]
    MalformedResponse { message: String },

    // ── Service errors ───────────────────────────────────────────────
    #[error("Server error: {message}")]
    Server {
        message: String,
        /// HTTP status code (if the reply carried one).
        status: Option<u16>,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Job errors ───────────────────────────────────────────────────
    #[error("Recovery failed: {message}")]
    JobFailed { message: String },

    #[error("Stopped tracking operation '{operation}'")]
    Cancelled { operation: String },

    // ── Local I/O ────────────────────────────────────────────────────
    #[error("Cannot read {path}: {reason}")]
    LocalFile { path: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Connectivity or decoding failure, as opposed to a reply the
    /// service produced on purpose.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::MalformedResponse { .. }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lawliet_api::Error> for CoreError {
    fn from(err: lawliet_api::Error) -> Self {
        match err {
            lawliet_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        message: e.url().map(|u| u.path().to_owned()).unwrap_or_default(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            lawliet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lawliet_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            lawliet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lawliet_api::Error::Server { message, status } if status == 404 => {
                CoreError::NotFound { message }
            }
            lawliet_api::Error::Server { message, status } => CoreError::Server {
                message,
                status: Some(status),
            },
            lawliet_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            lawliet_api::Error::LocalFile { path, source } => CoreError::LocalFile {
                path,
                reason: source.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_rejections_keep_their_message() {
        let err = CoreError::from(lawliet_api::Error::Server {
            message: "File recovery already in progress".into(),
            status: 409,
        });
        assert_eq!(err.to_string(), "Server error: File recovery already in progress");
        assert!(!err.is_transport());
    }

    #[test]
    fn missing_resources_map_to_not_found() {
        let err = CoreError::from(lawliet_api::Error::Server {
            message: "File not found".into(),
            status: 404,
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn decode_failures_are_transport_errors() {
        let err = CoreError::from(lawliet_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert!(err.is_transport());
    }

    #[test]
    fn validation_errors_pass_through() {
        let err = CoreError::from(ValidationError::BufferSizeRange { value: 0 });
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("buffer size range"));
    }
}
