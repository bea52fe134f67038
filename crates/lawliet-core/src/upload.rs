// ── Upload tracker ──
//
// Streams a local image to the service and publishes byte-level progress.
// A finished upload stays visible for a short linger, then the tracker
// resets to idle unless another upload has started in the meantime.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use lawliet_api::{RecoveryClient, UploadOutcome};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{CoreError, ValidationError};
use crate::notify::Notifier;
use crate::stream::StateStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    Idle,
    Uploading,
    Completed,
    Failed,
}

/// Observable state of the current (or last) upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadState {
    pub phase: UploadPhase,
    pub file_name: Option<String>,
    pub bytes_sent: u64,
    pub bytes_total: u64,
}

impl UploadState {
    fn idle() -> Self {
        Self {
            phase: UploadPhase::Idle,
            file_name: None,
            bytes_sent: 0,
            bytes_total: 0,
        }
    }

    /// Whole-number percentage, 0 when the size is unknown.
    pub fn percent(&self) -> u8 {
        lawliet_api::UploadProgress {
            bytes_sent: self.bytes_sent,
            bytes_total: self.bytes_total,
        }
        .percent()
    }
}

/// Uploads images one at a time and tracks their progress.
#[derive(Clone)]
pub struct UploadTracker {
    inner: Arc<UploadInner>,
}

struct UploadInner {
    client: RecoveryClient,
    notifier: Notifier,
    linger: Duration,
    busy: AtomicBool,
    generation: AtomicU64,
    state: watch::Sender<UploadState>,
}

impl UploadTracker {
    pub fn new(client: RecoveryClient, notifier: Notifier, linger: Duration) -> Self {
        let (state, _) = watch::channel(UploadState::idle());
        Self {
            inner: Arc::new(UploadInner {
                client,
                notifier,
                linger,
                busy: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    pub fn state(&self) -> UploadState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<UploadState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Upload the image at `path`. Only one upload runs at a time.
    pub async fn upload(&self, path: &Path) -> Result<UploadOutcome, CoreError> {
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let err = ValidationError::UploadInFlight;
            self.inner.notifier.warning(err.to_string());
            return Err(err.into());
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.inner.state.send_replace(UploadState {
            phase: UploadPhase::Uploading,
            file_name: file_name.clone(),
            ..UploadState::idle()
        });
        debug!(path = %path.display(), "uploading image");

        let sink = Arc::clone(&self.inner);
        let result = self
            .inner
            .client
            .upload_image(path, move |p| {
                sink.state.send_modify(|s| {
                    s.bytes_sent = p.bytes_sent;
                    s.bytes_total = p.bytes_total;
                });
            })
            .await
            .map_err(CoreError::from);

        let label = file_name.unwrap_or_else(|| path.display().to_string());
        match &result {
            Ok(outcome) => {
                self.inner.state.send_modify(|s| {
                    s.phase = UploadPhase::Completed;
                    s.bytes_sent = s.bytes_total;
                });
                info!(file = %label, stored_as = ?outcome.filename, "upload completed");
                self.inner
                    .notifier
                    .success(format!("Upload completed: {label}"));
            }
            Err(e) => {
                self.inner.state.send_modify(|s| s.phase = UploadPhase::Failed);
                warn!(file = %label, error = %e, "upload failed");
                self.inner.notifier.error(format!("Upload failed: {e}"));
            }
        }

        self.inner.busy.store(false, Ordering::Release);
        self.schedule_reset(generation);
        result
    }

    /// Reset to idle after the linger, unless a newer upload began.
    fn schedule_reset(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.linger).await;
            if inner.generation.load(Ordering::Acquire) == generation {
                inner.state.send_replace(UploadState::idle());
            }
        });
    }
}
