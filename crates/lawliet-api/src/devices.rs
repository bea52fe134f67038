// Block device discovery

use tracing::debug;

use crate::client::RecoveryClient;
use crate::error::Error;
use crate::models::{DeviceEntry, DevicesPayload};

impl RecoveryClient {
    /// List the block devices (disks and partitions) the server can read.
    ///
    /// `GET /devices`
    ///
    /// Mounted devices are included with their `mountpoint` set; callers
    /// must not offer them as recovery sources.
    pub async fn list_devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        let url = self.api_url(["devices"])?;
        debug!("listing block devices");
        let payload: DevicesPayload = self.get(url).await?;
        Ok(payload.devices)
    }
}
