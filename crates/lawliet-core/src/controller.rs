// ── Controller facade ──
//
// Ties the client, poller, job tracker, upload tracker, catalog and
// notifications together for one carving service. Every user-facing
// failure is published as a notification as well as returned.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use lawliet_api::{RecoveryClient, TlsMode, TransportConfig, UploadOutcome};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogView};
use crate::config::{ClientConfig, TlsVerification};
use crate::convert::flatten_file_groups;
use crate::error::CoreError;
use crate::job::{JobAck, RecoveryJob};
use crate::model::{BlockDevice, Operation, StoredImage};
use crate::notify::{Notification, Notifier};
use crate::poller::ProgressPoller;
use crate::selection::SourceSelection;
use crate::upload::UploadTracker;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ClientConfig,
    client: RecoveryClient,
    notifier: Notifier,
    poller: ProgressPoller,
    job: RecoveryJob,
    uploads: UploadTracker,
    catalog: Catalog,
    images: ArcSwap<Vec<Arc<StoredImage>>>,
    devices: ArcSwap<Vec<Arc<BlockDevice>>>,
}

impl Controller {
    /// Build a controller and its HTTP client from configuration.
    /// Makes no requests.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let client = RecoveryClient::new(config.url.clone(), &build_transport(&config))?;
        Ok(Self::with_client(config, client))
    }

    /// Build a controller around an existing client.
    pub fn with_client(config: ClientConfig, client: RecoveryClient) -> Self {
        let notifier = Notifier::new();
        let poller = ProgressPoller::new(client.clone());
        let job = RecoveryJob::new(
            client.clone(),
            poller.clone(),
            notifier.clone(),
            config.poll_interval,
        );
        let uploads = UploadTracker::new(client.clone(), notifier.clone(), config.upload_linger);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                notifier,
                poller,
                job,
                uploads,
                catalog: Catalog::new(),
                images: ArcSwap::from_pointee(Vec::new()),
                devices: ArcSwap::from_pointee(Vec::new()),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn poller(&self) -> &ProgressPoller {
        &self.inner.poller
    }

    pub fn job(&self) -> &RecoveryJob {
        &self.inner.job
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.inner.uploads
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn notifications(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.inner.notifier.subscribe()
    }

    pub fn images_snapshot(&self) -> Arc<Vec<Arc<StoredImage>>> {
        self.inner.images.load_full()
    }

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<BlockDevice>>> {
        self.inner.devices.load_full()
    }

    /// A fresh selection primed with the last image and device listings.
    pub fn selection(&self) -> SourceSelection {
        SourceSelection::with_sources(
            self.images_snapshot().iter().map(|i| (**i).clone()).collect(),
            self.devices_snapshot().iter().map(|d| (**d).clone()).collect(),
        )
    }

    // ── Listings ─────────────────────────────────────────────────────

    pub async fn refresh_images(&self) -> Result<Arc<Vec<Arc<StoredImage>>>, CoreError> {
        let entries = self
            .report("Error loading images", self.inner.client.list_images().await)?;
        let images: Vec<Arc<StoredImage>> = entries
            .into_iter()
            .map(|e| Arc::new(StoredImage::from(e)))
            .collect();
        debug!(count = images.len(), "images refreshed");
        self.inner.images.store(Arc::new(images));
        Ok(self.images_snapshot())
    }

    pub async fn refresh_devices(&self) -> Result<Arc<Vec<Arc<BlockDevice>>>, CoreError> {
        let entries = self
            .report("Error loading devices", self.inner.client.list_devices().await)?;
        let devices: Vec<Arc<BlockDevice>> = entries
            .into_iter()
            .map(|e| Arc::new(BlockDevice::from(e)))
            .collect();
        debug!(count = devices.len(), "devices refreshed");
        self.inner.devices.store(Arc::new(devices));
        Ok(self.devices_snapshot())
    }

    /// Re-fetch recovered files into the catalog. Active filters stay.
    pub async fn refresh_catalog(&self) -> Result<CatalogView, CoreError> {
        let groups = self.report(
            "Error loading recovered files",
            self.inner.client.list_recovered_files().await,
        )?;
        self.inner.catalog.set_catalog(flatten_file_groups(groups));
        Ok(self.inner.catalog.snapshot())
    }

    /// Refresh images, devices and the catalog concurrently.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let (images, devices, catalog) = tokio::join!(
            self.refresh_images(),
            self.refresh_devices(),
            self.refresh_catalog(),
        );
        images?;
        devices?;
        catalog?;
        Ok(())
    }

    // ── Images ───────────────────────────────────────────────────────

    /// Upload an image, then refresh the image listing.
    pub async fn upload_image(&self, path: &Path) -> Result<UploadOutcome, CoreError> {
        let outcome = self.inner.uploads.upload(path).await?;
        // The upload itself succeeded; a failed refresh is reported on its own.
        let _ = self.refresh_images().await;
        Ok(outcome)
    }

    /// Delete a stored image, then refresh the image listing.
    pub async fn delete_image(&self, name: &str) -> Result<(), CoreError> {
        self.report(
            "Error deleting image",
            self.inner.client.delete_image(name).await,
        )?;
        info!(image = %name, "image deleted");
        self.inner.notifier.success(format!("Deleted {name}"));
        let _ = self.refresh_images().await;
        Ok(())
    }

    // ── Recovery ─────────────────────────────────────────────────────

    pub async fn submit_recovery(
        &self,
        selection: &SourceSelection,
        buffer_size_mb: u32,
    ) -> Result<JobAck, CoreError> {
        self.inner.job.submit(selection, buffer_size_mb).await
    }

    /// One-shot progress fetch for any named operation.
    pub async fn operation(&self, name: &str) -> Result<Operation, CoreError> {
        let entry = self.report(
            "Error fetching progress",
            self.inner.client.get_progress(name).await,
        )?;
        Ok(Operation::from_entry(name, entry))
    }

    // ── Files ────────────────────────────────────────────────────────

    /// Download a recovered file by its catalog path.
    pub async fn download(&self, path: &str) -> Result<Bytes, CoreError> {
        self.report(
            "Error downloading file",
            self.inner.client.download_file(path).await,
        )
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Stop local tracking and wait for background polls to exit.
    pub async fn shutdown(&self) {
        self.inner.job.cancel();
        self.inner.poller.shutdown().await;
        debug!("controller shut down");
    }

    /// Publish a failure as an error notification and convert it.
    fn report<T>(&self, context: &str, result: Result<T, lawliet_api::Error>) -> Result<T, CoreError> {
        result.map_err(|e| {
            let err = CoreError::from(e);
            self.inner.notifier.error(format!("{context}: {err}"));
            err
        })
    }
}

/// Build a [`TransportConfig`] from the client configuration.
fn build_transport(config: &ClientConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        upload_timeout: config.upload_timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
