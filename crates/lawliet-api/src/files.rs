// Recovered file endpoints

use tracing::debug;

use crate::client::RecoveryClient;
use crate::error::Error;
use crate::models::{FileGroups, FilesPayload};

impl RecoveryClient {
    /// List recovered files grouped by format.
    ///
    /// `GET /files`
    pub async fn list_recovered_files(&self) -> Result<FileGroups, Error> {
        let url = self.api_url(["files"])?;
        debug!("listing recovered files");
        let payload: FilesPayload = self.get(url).await?;
        Ok(payload.files)
    }

    /// Download a recovered file's bytes.
    ///
    /// `GET /download/{path}` where `path` is the relative path from the
    /// file listing (e.g. `jpeg/restored_12.jpg`). Each `/`-separated
    /// component is encoded separately.
    pub async fn download_file(&self, path: &str) -> Result<bytes::Bytes, Error> {
        let segments = std::iter::once("download")
            .chain(path.split('/').filter(|segment| !segment.is_empty()));
        let url = self.api_url(segments)?;
        debug!(path, "downloading recovered file");
        self.get_bytes(url).await
    }
}
