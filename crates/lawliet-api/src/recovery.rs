// Recovery job endpoints
//
// Job submission and the per-operation progress record the server keeps
// for `file_recovery` and `file_upload`.

use tracing::debug;

use crate::client::RecoveryClient;
use crate::error::Error;
use crate::models::{Ack, OperationEntry, OperationPayload, RecoveryRequest};

impl RecoveryClient {
    /// Start a carving job.
    ///
    /// `POST /recover` with `{buffer_size, image_path}` or
    /// `{buffer_size, device_path}`.
    ///
    /// The server answers immediately and runs the job in the background;
    /// a second submission while one is running is refused with HTTP 409.
    pub async fn start_recovery(&self, request: &RecoveryRequest) -> Result<Ack, Error> {
        let url = self.api_url(["recover"])?;
        debug!(?request, "submitting recovery job");
        self.post(url, request).await
    }

    /// Fetch the current progress record of a named operation.
    ///
    /// `GET /progress/{operation}`
    pub async fn get_progress(&self, operation: &str) -> Result<OperationEntry, Error> {
        let url = self.api_url(["progress", operation])?;
        let payload: OperationPayload = self.get(url).await?;
        Ok(payload.operation)
    }
}
