// ── Acquisition sources ──
//
// Stored images and discovered block devices, the two things a carving
// job can read from.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which kind of source the selection is currently choosing between.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceMode {
    #[default]
    Image,
    Device,
}

/// A disk image held by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub name: String,
    pub size_human: String,
    pub size_bytes: Option<u64>,
}

/// A block device from the service's device scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub path: String,
    pub size_human: String,
    pub model: String,
    /// `Some` only when the device is mounted somewhere.
    pub mountpoint: Option<String>,
}

impl BlockDevice {
    pub fn is_mounted(&self) -> bool {
        self.mountpoint.is_some()
    }
}

/// Either kind of acquisition source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcquisitionSource {
    Image(StoredImage),
    Device(BlockDevice),
}

impl AcquisitionSource {
    /// Image name or device path.
    pub fn label(&self) -> &str {
        match self {
            Self::Image(image) => &image.name,
            Self::Device(device) => &device.path,
        }
    }

    pub fn size_human(&self) -> &str {
        match self {
            Self::Image(image) => &image.size_human,
            Self::Device(device) => &device.size_human,
        }
    }

    pub fn mode(&self) -> SourceMode {
        match self {
            Self::Image(_) => SourceMode::Image,
            Self::Device(_) => SourceMode::Device,
        }
    }
}
