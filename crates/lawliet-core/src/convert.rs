// ── API-to-domain type conversions ──
//
// Bridges raw `lawliet_api` wire records into canonical domain types.
// Missing optional fields get the same fallbacks the service's own web
// client shows (`Unknown` model, empty size).

use lawliet_api::{DeviceEntry, FileEntry, FileGroups, ImageEntry, OperationEntry};

use crate::model::operation::clamp_progress;
use crate::model::{BlockDevice, Operation, OperationStatus, RecoveredFile, StoredImage};

const UNKNOWN_MODEL: &str = "Unknown";

impl From<ImageEntry> for StoredImage {
    fn from(entry: ImageEntry) -> Self {
        Self {
            name: entry.name,
            size_human: entry.size_human,
            size_bytes: entry.size,
        }
    }
}

impl From<DeviceEntry> for BlockDevice {
    fn from(entry: DeviceEntry) -> Self {
        Self {
            path: entry.path,
            size_human: entry.size.unwrap_or_default(),
            model: entry
                .model
                .map(|m| m.trim().to_owned())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNKNOWN_MODEL.to_owned()),
            // lsblk reports unmounted devices with a null or empty mountpoint
            mountpoint: entry.mountpoint.filter(|m| !m.trim().is_empty()),
        }
    }
}

impl Operation {
    /// Build a snapshot of operation `name` from its wire record.
    pub fn from_entry(name: &str, entry: OperationEntry) -> Self {
        Self {
            name: name.to_owned(),
            status: OperationStatus::from_wire(&entry.status),
            progress: clamp_progress(entry.progress),
            message: entry.message,
        }
    }
}

fn recovered_file(format: &str, entry: FileEntry) -> RecoveredFile {
    RecoveredFile {
        name: entry.name,
        path: entry.path,
        format: format.to_owned(),
        size_human: entry.size_human,
        size_bytes: entry.size,
        source: entry.source.filter(|s| !s.is_empty()),
    }
}

/// Flatten format-grouped listings into one catalog, keeping group order
/// and then entry order within each group.
pub fn flatten_file_groups(groups: FileGroups) -> Vec<RecoveredFile> {
    groups
        .into_iter()
        .flat_map(|(format, entries)| {
            entries
                .into_iter()
                .map(move |entry| recovered_file(&format, entry))
        })
        .collect()
}
