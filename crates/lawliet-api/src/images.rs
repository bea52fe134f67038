// Stored image endpoints
//
// Listing, multipart upload with byte-level progress, and deletion of
// the disk images kept in the server's storage directory.

use std::path::Path;

use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::client::RecoveryClient;
use crate::error::Error;
use crate::models::{Ack, ImageEntry, ImagesPayload, UploadOutcome, UploadProgress};

impl RecoveryClient {
    /// List the images available for carving.
    ///
    /// `GET /images`
    pub async fn list_images(&self) -> Result<Vec<ImageEntry>, Error> {
        let url = self.api_url(["images"])?;
        debug!("listing images");
        let payload: ImagesPayload = self.get(url).await?;
        Ok(payload.images)
    }

    /// Upload a local disk image as the multipart `file` field.
    ///
    /// `POST /upload-image`
    ///
    /// The body is streamed from disk; `on_progress` is invoked once per
    /// chunk handed to the connection with cumulative byte counts. The
    /// server only accepts `.raw`, `.img`, `.dd` and `.bin` names and
    /// refuses to overwrite an existing image; both surface as
    /// [`Error::Server`].
    pub async fn upload_image<F>(&self, path: &Path, on_progress: F) -> Result<UploadOutcome, Error>
    where
        F: Fn(UploadProgress) + Send + Sync + 'static,
    {
        let local_error = |source| Error::LocalFile {
            path: path.display().to_string(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(local_error)?;
        let bytes_total = file.metadata().await.map_err(local_error)?.len();
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());

        debug!(file = %file_name, bytes = bytes_total, "uploading image");
        on_progress(UploadProgress {
            bytes_sent: 0,
            bytes_total,
        });

        let mut bytes_sent = 0u64;
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            bytes_sent += chunk.len() as u64;
            on_progress(UploadProgress {
                bytes_sent,
                bytes_total,
            });
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), bytes_total)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        let url = self.api_url(["upload-image"])?;
        self.post_multipart(url, form).await
    }

    /// Delete a stored image by name.
    ///
    /// `DELETE /delete-image/{name}`
    pub async fn delete_image(&self, name: &str) -> Result<Ack, Error> {
        let url = self.api_url(["delete-image", name])?;
        debug!(image = name, "deleting image");
        self.delete(url).await
    }
}
