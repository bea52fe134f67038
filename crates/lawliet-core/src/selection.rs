// ── Source selection ──
//
// Pure state machine behind "what will the next job read from". Holds the
// mode, the current image and device choices, a manually typed device
// path, and the last known image and device lists. Every transition
// recomputes whether a job can be submitted.

use lawliet_api::RecoverySource;
use tracing::debug;

use crate::error::ValidationError;
use crate::model::{AcquisitionSource, BlockDevice, SourceMode, StoredImage};

/// Selection state for the next recovery job.
///
/// A manual device path takes precedence over the device picked from the
/// scan. Mounted devices never resolve to a target, whether picked or
/// typed, and are rejected again at resolution time in case a rescan
/// found them mounted after they were picked.
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    mode: SourceMode,
    images: Vec<StoredImage>,
    devices: Vec<BlockDevice>,
    selected_image: Option<String>,
    selected_device: Option<String>,
    manual_path: String,
    can_submit: bool,
}

impl SourceSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection primed with the given image and device lists.
    pub fn with_sources(images: Vec<StoredImage>, devices: Vec<BlockDevice>) -> Self {
        let mut selection = Self {
            images,
            devices,
            ..Self::default()
        };
        selection.recompute();
        selection
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn images(&self) -> &[StoredImage] {
        &self.images
    }

    pub fn devices(&self) -> &[BlockDevice] {
        &self.devices
    }

    pub fn selected_image(&self) -> Option<&str> {
        self.selected_image.as_deref()
    }

    pub fn selected_device(&self) -> Option<&str> {
        self.selected_device.as_deref()
    }

    pub fn manual_path(&self) -> &str {
        &self.manual_path
    }

    /// Whether [`target`](Self::target) currently resolves.
    pub fn can_submit(&self) -> bool {
        self.can_submit
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Switch between image and device mode. Choices made in the other
    /// mode are kept for when the user switches back.
    pub fn switch_mode(&mut self, mode: SourceMode) {
        self.mode = mode;
        self.recompute();
    }

    /// Pick a stored image by name. An empty name clears the choice.
    pub fn select_image(&mut self, name: &str) {
        self.selected_image = Some(name.to_owned()).filter(|n| !n.is_empty());
        self.recompute();
    }

    /// Pick a discovered device by path.
    ///
    /// Mounted or undiscovered devices are refused and leave the previous
    /// choice unchanged. An empty path clears the choice.
    pub fn select_device(&mut self, path: &str) -> Result<(), ValidationError> {
        if path.is_empty() {
            self.clear_device();
            return Ok(());
        }

        let device = self
            .find_device(path)
            .ok_or_else(|| ValidationError::UnknownDevice { path: path.to_owned() })?;
        if let Some(mountpoint) = &device.mountpoint {
            return Err(ValidationError::MountedDevice {
                path: path.to_owned(),
                mountpoint: mountpoint.clone(),
            });
        }

        self.selected_device = Some(path.to_owned());
        self.recompute();
        Ok(())
    }

    pub fn clear_device(&mut self) {
        self.selected_device = None;
        self.recompute();
    }

    /// Set the manually typed device path. Surrounding whitespace is
    /// ignored; a blank path falls back to the picked device.
    pub fn set_manual_path(&mut self, path: &str) {
        path.trim().clone_into(&mut self.manual_path);
        self.recompute();
    }

    /// Replace the known image list. A selected image that is no longer
    /// listed is dropped.
    pub fn set_images(&mut self, images: Vec<StoredImage>) {
        self.images = images;
        if let Some(name) = &self.selected_image {
            if !self.images.iter().any(|i| &i.name == name) {
                debug!(image = %name, "selected image vanished from listing");
                self.selected_image = None;
            }
        }
        self.recompute();
    }

    /// Replace the known device list. The picked device is kept; if it
    /// vanished or became mounted, it simply stops resolving.
    pub fn set_devices(&mut self, devices: Vec<BlockDevice>) {
        self.devices = devices;
        self.recompute();
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// The source a job submitted now would read from, or `None` when
    /// nothing valid is selected.
    pub fn target(&self) -> Option<RecoverySource> {
        match self.mode {
            SourceMode::Image => self
                .selected_image
                .clone()
                .map(RecoverySource::ImagePath),
            SourceMode::Device => self.device_target().map(RecoverySource::DevicePath),
        }
    }

    /// Like [`target`](Self::target), but with the full listing record
    /// when the target appears in the last scan.
    pub fn describe(&self) -> Option<AcquisitionSource> {
        match self.target()? {
            RecoverySource::ImagePath(name) => self
                .images
                .iter()
                .find(|i| i.name == name)
                .cloned()
                .map(AcquisitionSource::Image),
            RecoverySource::DevicePath(path) => self
                .find_device(&path)
                .cloned()
                .map(AcquisitionSource::Device),
        }
    }

    fn device_target(&self) -> Option<String> {
        let path = if self.manual_path.is_empty() {
            let picked = self.selected_device.as_deref()?;
            // A picked device must still be in the scan.
            self.find_device(picked)?;
            picked
        } else {
            self.manual_path.as_str()
        };

        if self.find_device(path).is_some_and(BlockDevice::is_mounted) {
            return None;
        }
        Some(path.to_owned())
    }

    fn find_device(&self, path: &str) -> Option<&BlockDevice> {
        self.devices.iter().find(|d| d.path == path)
    }

    fn recompute(&mut self) {
        self.can_submit = self.target().is_some();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn image(name: &str) -> StoredImage {
        StoredImage {
            name: name.into(),
            size_human: "500.00 MB".into(),
            size_bytes: Some(524_288_000),
        }
    }

    fn device(path: &str, mountpoint: Option<&str>) -> BlockDevice {
        BlockDevice {
            path: path.into(),
            size_human: "14.9G".into(),
            model: "Unknown".into(),
            mountpoint: mountpoint.map(Into::into),
        }
    }

    fn lab() -> SourceSelection {
        SourceSelection::with_sources(
            vec![image("disk1.img"), image("usb.dd")],
            vec![device("/dev/sda", Some("/")), device("/dev/sdb", None)],
        )
    }

    #[test]
    fn empty_selection_cannot_submit() {
        let selection = lab();
        assert_eq!(selection.mode(), SourceMode::Image);
        assert!(!selection.can_submit());
        assert_eq!(selection.target(), None);
    }

    #[test]
    fn image_mode_resolves_the_selected_image() {
        let mut selection = lab();
        selection.select_image("disk1.img");

        assert!(selection.can_submit());
        assert_eq!(
            selection.target(),
            Some(RecoverySource::ImagePath("disk1.img".into()))
        );
        assert_eq!(
            selection.describe().map(|s| s.label().to_owned()),
            Some("disk1.img".into())
        );
    }

    #[test]
    fn empty_image_name_clears_choice() {
        let mut selection = lab();
        selection.select_image("disk1.img");
        selection.select_image("");
        assert!(!selection.can_submit());
    }

    #[test]
    fn device_mode_ignores_the_image_choice() {
        let mut selection = lab();
        selection.select_image("disk1.img");
        selection.switch_mode(SourceMode::Device);

        assert!(!selection.can_submit());
        assert_eq!(selection.target(), None);

        selection.switch_mode(SourceMode::Image);
        assert!(selection.can_submit());
    }

    #[test]
    fn unmounted_device_resolves() {
        let mut selection = lab();
        selection.switch_mode(SourceMode::Device);
        selection.select_device("/dev/sdb").expect("unmounted device");

        assert_eq!(
            selection.target(),
            Some(RecoverySource::DevicePath("/dev/sdb".into()))
        );
    }

    #[test]
    fn mounted_device_is_refused() {
        let mut selection = lab();
        selection.switch_mode(SourceMode::Device);

        let err = selection.select_device("/dev/sda").expect_err("mounted");
        assert_eq!(
            err,
            ValidationError::MountedDevice {
                path: "/dev/sda".into(),
                mountpoint: "/".into(),
            }
        );
        assert_eq!(selection.selected_device(), None);
        assert!(!selection.can_submit());
    }

    #[test]
    fn undiscovered_device_is_refused() {
        let mut selection = lab();
        let err = selection.select_device("/dev/nvme0n1").expect_err("unknown");
        assert!(matches!(err, ValidationError::UnknownDevice { .. }));
    }

    #[test]
    fn manual_path_overrides_picked_device() {
        let mut selection = lab();
        selection.switch_mode(SourceMode::Device);
        selection.select_device("/dev/sdb").expect("unmounted device");
        selection.set_manual_path("  /dev/loop7 ");

        assert_eq!(selection.manual_path(), "/dev/loop7");
        assert_eq!(
            selection.target(),
            Some(RecoverySource::DevicePath("/dev/loop7".into()))
        );

        selection.set_manual_path("   ");
        assert_eq!(
            selection.target(),
            Some(RecoverySource::DevicePath("/dev/sdb".into()))
        );
    }

    #[test]
    fn manual_path_naming_a_mounted_device_does_not_resolve() {
        let mut selection = lab();
        selection.switch_mode(SourceMode::Device);
        selection.set_manual_path("/dev/sda");

        assert!(!selection.can_submit());
        assert_eq!(selection.target(), None);
    }

    #[test]
    fn device_mounted_after_selection_stops_resolving() {
        let mut selection = lab();
        selection.switch_mode(SourceMode::Device);
        selection.select_device("/dev/sdb").expect("unmounted device");
        assert!(selection.can_submit());

        selection.set_devices(vec![
            device("/dev/sda", Some("/")),
            device("/dev/sdb", Some("/media/usb")),
        ]);

        assert_eq!(selection.selected_device(), Some("/dev/sdb"));
        assert!(!selection.can_submit());
        assert_eq!(selection.target(), None);
    }

    #[test]
    fn vanished_device_stops_resolving() {
        let mut selection = lab();
        selection.switch_mode(SourceMode::Device);
        selection.select_device("/dev/sdb").expect("unmounted device");

        selection.set_devices(vec![device("/dev/sda", Some("/"))]);
        assert!(!selection.can_submit());
    }

    #[test]
    fn vanished_image_is_dropped() {
        let mut selection = lab();
        selection.select_image("usb.dd");

        selection.set_images(vec![image("disk1.img")]);

        assert_eq!(selection.selected_image(), None);
        assert!(!selection.can_submit());
    }
}
