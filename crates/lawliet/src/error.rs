//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lawliet_config::ConfigError;
use lawliet_core::{CoreError, ValidationError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the carving service at {url}")]
    #[diagnostic(
        code(lawliet::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             Reason: {reason}\n\
             Try: lawliet --server http://host:5000/api images list"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(lawliet::timeout),
        help("Increase the timeout with --timeout or check the service's load.")
    )]
    Timeout { seconds: u64 },

    #[error("Malformed response from the carving service: {message}")]
    #[diagnostic(
        code(lawliet::malformed_response),
        help("Check that --server points at the service's /api root.")
    )]
    MalformedResponse { message: String },

    // ── Service ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(lawliet::not_found),
        help("Run: lawliet {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Service rejected the request: {message}")]
    #[diagnostic(
        code(lawliet::conflict),
        help("Another job is running on the service. Follow it with: lawliet progress")
    )]
    Conflict { message: String },

    #[error("Service error: {message}")]
    #[diagnostic(code(lawliet::server))]
    Server { message: String },

    #[error("Recovery failed: {message}")]
    #[diagnostic(code(lawliet::job_failed))]
    JobFailed { message: String },

    #[error("Stopped following '{operation}'")]
    #[diagnostic(
        code(lawliet::cancelled),
        help("The job keeps running on the service. Check it with: lawliet progress")
    )]
    Cancelled { operation: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lawliet::validation))]
    Validation { field: String, reason: String },

    #[error("Device {path} is mounted at {mountpoint}")]
    #[diagnostic(
        code(lawliet::mounted_device),
        help("Unmount it first (umount {mountpoint}), then retry.")
    )]
    MountedDevice { path: String, mountpoint: String },

    #[error("{0}")]
    #[diagnostic(code(lawliet::busy))]
    Busy(String),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lawliet::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lawliet config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(lawliet::config),
        help("Inspect the resolved configuration with: lawliet config show")
    )]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(lawliet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Cannot access {path}: {reason}")]
    #[diagnostic(code(lawliet::local_file))]
    LocalFile { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(lawliet::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::MalformedResponse { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::Busy(_) => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::MountedDevice { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => v.into(),

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::Server {
                message,
                status: Some(409),
            } => CliError::Conflict { message },

            CoreError::Server { message, .. } => CliError::Server { message },

            CoreError::NotFound { message } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: message,
                list_command: "files list".into(),
            },

            CoreError::JobFailed { message } => CliError::JobFailed { message },

            CoreError::Cancelled { operation } => CliError::Cancelled { operation },

            CoreError::LocalFile { path, reason } => CliError::LocalFile { path, reason },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::BufferSizeRange { .. } => CliError::Validation {
                field: "buffer-size".into(),
                reason: err.to_string(),
            },
            ValidationError::NoSourceSelected => CliError::Validation {
                field: "source".into(),
                reason: "pass --image, --device or --device-path".into(),
            },
            ValidationError::MountedDevice { path, mountpoint } => {
                CliError::MountedDevice { path, mountpoint }
            }
            ValidationError::UnknownDevice { path } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: path,
                list_command: "devices list".into(),
            },
            ValidationError::JobInFlight | ValidationError::UploadInFlight => {
                CliError::Busy(err.to_string())
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see lawliet config profiles)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
