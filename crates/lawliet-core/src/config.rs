// ── Runtime client configuration ──
//
// Describes how to reach a carving service and how often to poll it.
// Never touches disk; lawliet-config resolves profiles into this type.

use std::time::Duration;

use url::Url;

/// Default API root of a locally running carving service.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000/api";

/// Interval between progress polls of a tracked operation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// How long a finished upload stays visible before the tracker resets.
pub const DEFAULT_UPLOAD_LINGER: Duration = Duration::from_secs(2);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab servers).
    DangerAcceptInvalid,
}

/// Everything the [`Controller`](crate::Controller) needs to talk to a
/// carving service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout for everything except uploads.
    pub timeout: Duration,
    /// Upload timeout; `None` lets large images stream as long as needed.
    pub upload_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub upload_linger: Duration,
}

impl ClientConfig {
    /// Configuration for `url` with stock timings.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            upload_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            upload_linger: DEFAULT_UPLOAD_LINGER,
        }
    }
}
