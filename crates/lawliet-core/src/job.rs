// ── Recovery job controller ──
//
// Validates and submits a carving job, then tracks it through the
// progress poller until the service reports a terminal status. The
// terminal outcome is applied exactly once per submitted job.

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use lawliet_api::{RecoveryClient, RecoveryRequest};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{CoreError, MAX_BUFFER_SIZE_MB, MIN_BUFFER_SIZE_MB, ValidationError};
use crate::model::{FILE_RECOVERY, Operation, OperationStatus};
use crate::notify::Notifier;
use crate::poller::ProgressPoller;
use crate::selection::SourceSelection;
use crate::stream::StateStream;

// ── JobState ─────────────────────────────────────────────────────

/// Where the tracked job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum JobPhase {
    /// No job tracked; a new one may be submitted.
    Idle,
    /// `POST /recover` is in flight.
    Submitting,
    /// Accepted by the service and being polled.
    Running,
    Completed,
    Failed { message: String },
}

impl JobPhase {
    /// Whether a job is submitting or running.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting | Self::Running)
    }
}

/// Observable state of the recovery job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobState {
    pub phase: JobPhase,
    /// Last status the service reported, if polled at least once.
    pub status: Option<OperationStatus>,
    pub progress: u8,
    pub message: String,
}

impl JobState {
    fn idle() -> Self {
        Self {
            phase: JobPhase::Idle,
            status: None,
            progress: 0,
            message: String::new(),
        }
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.phase.is_busy()
    }
}

/// What `submit` returns once the service has accepted a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobAck {
    /// Name of the operation to poll.
    pub operation: String,
    pub message: Option<String>,
}

// ── RecoveryJob ──────────────────────────────────────────────────

/// Submits recovery jobs and tracks the one in flight.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct RecoveryJob {
    inner: Arc<JobInner>,
}

struct JobInner {
    client: RecoveryClient,
    poller: ProgressPoller,
    notifier: Notifier,
    interval: Duration,
    in_flight: AtomicBool,
    state: watch::Sender<JobState>,
}

impl RecoveryJob {
    pub fn new(
        client: RecoveryClient,
        poller: ProgressPoller,
        notifier: Notifier,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(JobState::idle());
        Self {
            inner: Arc::new(JobInner {
                client,
                poller,
                notifier,
                interval,
                in_flight: AtomicBool::new(false),
                state,
            }),
        }
    }

    /// Validate, submit, and start tracking a recovery job.
    ///
    /// Validation happens before any request: the buffer size must be in
    /// range, the selection must resolve to a target, and no other job may
    /// be in flight. On a rejected submission the job is not tracked and
    /// submission is enabled again.
    pub async fn submit(
        &self,
        selection: &SourceSelection,
        buffer_size_mb: u32,
    ) -> Result<JobAck, CoreError> {
        let request = match validate(selection, buffer_size_mb) {
            Ok(request) => request,
            Err(e) => {
                self.inner.notifier.warning(e.to_string());
                return Err(e.into());
            }
        };

        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let err = ValidationError::JobInFlight;
            self.inner.notifier.warning(err.to_string());
            return Err(err.into());
        }

        self.inner.state.send_replace(JobState {
            phase: JobPhase::Submitting,
            ..JobState::idle()
        });
        debug!(?request, "submitting recovery job");

        let ack = match self.inner.client.start_recovery(&request).await {
            Ok(ack) => ack,
            Err(e) => {
                let err = CoreError::from(e);
                self.inner.in_flight.store(false, Ordering::Release);
                self.inner.state.send_replace(JobState::idle());
                warn!(error = %err, "recovery submission rejected");
                self.inner
                    .notifier
                    .error(format!("Failed to start recovery: {err}"));
                return Err(err);
            }
        };

        self.inner.state.send_modify(|s| {
            s.phase = JobPhase::Running;
            s.message = ack.message.clone().unwrap_or_default();
        });
        info!(operation = FILE_RECOVERY, "recovery job accepted");
        self.inner.notifier.success("Recovery started");

        let weak: Weak<JobInner> = Arc::downgrade(&self.inner);
        self.inner
            .poller
            .start(FILE_RECOVERY, self.inner.interval, move |op: Operation| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply(&op);
                }
            });

        Ok(JobAck {
            operation: FILE_RECOVERY.to_owned(),
            message: ack.message,
        })
    }

    /// Stop tracking the job. The service keeps carving; only the local
    /// tracking ends. A no-op when nothing is tracked.
    pub fn cancel(&self) {
        if self.inner.in_flight.swap(false, Ordering::AcqRel) {
            self.inner.poller.stop(FILE_RECOVERY);
            self.inner.state.send_replace(JobState::idle());
            info!("stopped tracking recovery job");
            self.inner
                .notifier
                .info("Stopped tracking recovery; the service keeps running it");
        }
    }

    /// Whether a job is currently submitting or running.
    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> JobState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<JobState> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Wait until the tracked job settles.
    ///
    /// Resolves with the final state on completion, with
    /// [`CoreError::JobFailed`] when the service reports an error, and
    /// with [`CoreError::Cancelled`] when tracking is cancelled first.
    pub async fn wait_for_terminal(&self) -> Result<JobState, CoreError> {
        let mut rx = self.inner.state.subscribe();
        let state = rx
            .wait_for(|s| !s.phase.is_busy())
            .await
            .map_err(|_| cancelled())?
            .clone();

        match &state.phase {
            JobPhase::Completed => Ok(state),
            JobPhase::Failed { message } => Err(CoreError::JobFailed {
                message: message.clone(),
            }),
            JobPhase::Idle | JobPhase::Submitting | JobPhase::Running => Err(cancelled()),
        }
    }
}

impl JobInner {
    /// Reducer for each polled snapshot of the recovery operation.
    fn apply(&self, op: &Operation) {
        if !self.in_flight.load(Ordering::Acquire) {
            return;
        }

        self.state.send_modify(|s| {
            s.status = Some(op.status);
            s.progress = op.progress;
            s.message.clone_from(&op.message);
        });

        if !op.is_terminal() || !self.in_flight.swap(false, Ordering::AcqRel) {
            return;
        }

        // Notify before publishing the phase so waiters see both.
        self.poller.stop(FILE_RECOVERY);
        let phase = if op.status == OperationStatus::Completed {
            info!("recovery job completed");
            self.notifier.success("Recovery completed!");
            JobPhase::Completed
        } else {
            warn!(message = %op.message, "recovery job failed");
            self.notifier.error(format!("Error: {}", op.message));
            JobPhase::Failed {
                message: op.message.clone(),
            }
        };
        self.state.send_modify(|s| s.phase = phase);
    }
}

fn validate(
    selection: &SourceSelection,
    buffer_size_mb: u32,
) -> Result<RecoveryRequest, ValidationError> {
    if !(MIN_BUFFER_SIZE_MB..=MAX_BUFFER_SIZE_MB).contains(&buffer_size_mb) {
        return Err(ValidationError::BufferSizeRange {
            value: buffer_size_mb,
        });
    }
    let source = selection.target().ok_or(ValidationError::NoSourceSelected)?;
    Ok(RecoveryRequest {
        buffer_size: buffer_size_mb,
        source,
    })
}

fn cancelled() -> CoreError {
    CoreError::Cancelled {
        operation: FILE_RECOVERY.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoredImage;

    fn selection_with_image() -> SourceSelection {
        let mut selection = SourceSelection::with_sources(
            vec![StoredImage {
                name: "disk1.img".into(),
                size_human: "500.00 MB".into(),
                size_bytes: None,
            }],
            Vec::new(),
        );
        selection.select_image("disk1.img");
        selection
    }

    #[test]
    fn buffer_size_is_checked_before_source() {
        let err = validate(&SourceSelection::new(), 0).expect_err("zero buffer");
        assert_eq!(err, ValidationError::BufferSizeRange { value: 0 });

        let err = validate(&selection_with_image(), 1025).expect_err("oversized buffer");
        assert_eq!(err, ValidationError::BufferSizeRange { value: 1025 });
    }

    #[test]
    fn missing_source_is_rejected() {
        let err = validate(&SourceSelection::new(), 8).expect_err("no source");
        assert_eq!(err, ValidationError::NoSourceSelected);
    }

    #[test]
    fn valid_selection_builds_request() {
        let request = validate(&selection_with_image(), 8).expect("valid");
        assert_eq!(request.buffer_size, 8);
        assert_eq!(
            request.source,
            lawliet_api::RecoverySource::ImagePath("disk1.img".into())
        );
    }

    #[test]
    fn busy_phases_block_submission() {
        let mut state = JobState::idle();
        assert!(state.can_submit());
        state.phase = JobPhase::Running;
        assert!(!state.can_submit());
        state.phase = JobPhase::Failed {
            message: "boom".into(),
        };
        assert!(state.can_submit());
    }
}
