//! Windows device source backed by WMI
//!
//! `Win32_DiskDrive` rows describe whole physical drives and
//! `Win32_DiskPartition` rows describe their slices, linked to the parent
//! drive by `DiskIndex`. Drive removability comes from `MediaType`, which
//! WMI leaves absent on some virtual drives.

use std::path::PathBuf;

use serde::Deserialize;
use wmi::{COMLibrary, WMIConnection};

use crate::error::{Error, Result};
use crate::source::{classify, RawDevice, RawDeviceSource};
use crate::types::DeviceClass;

/// Create WMI connection with robust COM initialization.
/// Handles cases where COM is already initialized by the host application.
fn create_wmi_connection() -> Result<WMIConnection> {
    if let Ok(com) = COMLibrary::new() {
        if let Ok(conn) = WMIConnection::with_namespace_path("root\\CIMV2", com) {
            return Ok(conn);
        }
    }

    if let Ok(com) = COMLibrary::without_security() {
        if let Ok(conn) = WMIConnection::with_namespace_path("root\\CIMV2", com) {
            return Ok(conn);
        }
    }

    // Assume COM is already initialized by the runtime (e.g. GUI apps)
    let com = unsafe { COMLibrary::assume_initialized() };
    WMIConnection::with_namespace_path("root\\CIMV2", com)
        .map_err(|e| Error::SourceUnavailable(e.to_string()))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32DiskDrive {
    model: Option<String>,
    size: Option<u64>,
    bytes_per_sector: Option<u64>,
    media_type: Option<String>,
    index: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32DiskPartition {
    size: Option<u64>,
    block_size: Option<u64>,
    index: u32,
    disk_index: u32,
}

/// One WMI row resolved into a flat record
pub(crate) struct WindowsDevice {
    devnode: PathBuf,
    model: Option<String>,
    size: Option<u64>,
    block_size: Option<u64>,
    removable: Option<bool>,
    class: DeviceClass,
}

impl From<Win32DiskDrive> for WindowsDevice {
    fn from(row: Win32DiskDrive) -> Self {
        Self {
            devnode: PathBuf::from(format!(r"\\.\PhysicalDrive{}", row.index)),
            model: row.model.map(|m| m.trim().to_owned()),
            size: row.size,
            block_size: row.bytes_per_sector,
            removable: media_type_removable(row.media_type.as_deref()),
            class: classify(false, false),
        }
    }
}

impl From<Win32DiskPartition> for WindowsDevice {
    fn from(row: Win32DiskPartition) -> Self {
        Self {
            // NT exposes partitions one-based under their parent drive
            devnode: PathBuf::from(format!(
                r"\\.\Harddisk{}Partition{}",
                row.disk_index,
                row.index + 1
            )),
            model: None,
            size: row.size,
            block_size: row.block_size,
            // Win32_DiskPartition carries no removability property
            removable: None,
            class: classify(true, false),
        }
    }
}

/// `MediaType` is a display string; only definite answers map to a boolean
fn media_type_removable(media_type: Option<&str>) -> Option<bool> {
    let media = media_type?;
    if media.contains("Removable") {
        Some(true)
    } else if media.contains("Fixed") {
        Some(false)
    } else {
        None
    }
}

impl RawDevice for WindowsDevice {
    fn devnode(&self) -> PathBuf {
        self.devnode.clone()
    }

    fn model(&self) -> Option<String> {
        self.model.clone()
    }

    fn size_bytes(&self) -> Option<u64> {
        self.size
    }

    fn block_size(&self) -> Option<u64> {
        self.block_size
    }

    fn removable(&self) -> Option<bool> {
        self.removable
    }

    fn class(&self) -> Option<DeviceClass> {
        Some(self.class)
    }
}

/// One WMI connection opened for a pass
pub(crate) struct Source {
    conn: WMIConnection,
}

impl RawDeviceSource for Source {
    type Device = WindowsDevice;
    type Iter = Vec<Result<WindowsDevice>>;

    fn open() -> Result<Self> {
        create_wmi_connection().map(|conn| Self { conn })
    }

    fn devices(self) -> Self::Iter {
        let drives: Vec<Win32DiskDrive> = self
            .conn
            .raw_query("SELECT Model, Size, BytesPerSector, MediaType, Index FROM Win32_DiskDrive")
            .unwrap_or_default();

        let partitions: Vec<Win32DiskPartition> = self
            .conn
            .raw_query("SELECT Size, BlockSize, Index, DiskIndex FROM Win32_DiskPartition")
            .unwrap_or_default();

        drives
            .into_iter()
            .map(|row| Ok(WindowsDevice::from(row)))
            .chain(
                partitions
                    .into_iter()
                    .map(|row| Ok(WindowsDevice::from(row))),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_maps_to_tri_state() {
        assert_eq!(media_type_removable(Some("Removable Media")), Some(true));
        assert_eq!(
            media_type_removable(Some("Fixed hard disk media")),
            Some(false)
        );
        assert_eq!(media_type_removable(Some("Unknown")), None);
        assert_eq!(media_type_removable(None), None);
    }

    #[test]
    fn drive_row_resolves_to_whole_disk() {
        let dev = WindowsDevice::from(Win32DiskDrive {
            model: Some("WDC WD10EZEX ".into()),
            size: Some(1_000_204_886_016),
            bytes_per_sector: Some(512),
            media_type: Some("Fixed hard disk media".into()),
            index: 0,
        });
        assert_eq!(dev.devnode(), PathBuf::from(r"\\.\PhysicalDrive0"));
        assert_eq!(dev.model().as_deref(), Some("WDC WD10EZEX"));
        assert_eq!(dev.removable(), Some(false));
        assert_eq!(dev.class(), Some(DeviceClass::Disk));
    }

    #[test]
    fn partition_row_resolves_to_partition() {
        let dev = WindowsDevice::from(Win32DiskPartition {
            size: Some(104_857_600),
            block_size: Some(512),
            index: 0,
            disk_index: 1,
        });
        assert_eq!(dev.devnode(), PathBuf::from(r"\\.\Harddisk1Partition1"));
        assert_eq!(dev.model(), None);
        assert_eq!(dev.removable(), None);
        assert_eq!(dev.class(), Some(DeviceClass::Partition));
    }
}
