//! # disklist
//!
//! Cross-platform block device inventory. disklist enumerates the disks,
//! partitions, and disk-image files attached to a host and reports each one
//! through a single platform-neutral record type, so imaging and backup
//! tools can consume one contract instead of three registries.
//!
//! ## Features
//!
//! - **One record type**: [`Disk`] carries path, model, size, block size,
//!   removability, and device class on every platform
//! - **Explicit unknowns**: properties the OS cannot report stay `None` or
//!   [`Removable::Unknown`] — no sentinel values, no silent defaults
//! - **One synchronous snapshot**: [`enumerate_disks`] performs a single
//!   blocking pass and moves the whole result to the caller
//! - **Path probing**: [`probe_path`] resolves an explicit device node or
//!   treats any other file as a disk image
//!
//! ## Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let disks = disklist::enumerate_disks()?;
//!
//! for disk in &disks {
//!     println!(
//!         "{} ({}, removable: {})",
//!         disk.devnode.display(),
//!         disk.class,
//!         disk.removable
//!     );
//!     if let Some(size) = disk.size {
//!         println!("  {} bytes", size);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Support
//!
//! | Platform | Registry                                    | Partitions | Block size |
//! |----------|---------------------------------------------|------------|------------|
//! | Linux    | sysfs (`/sys/class/block`)                  | ✅         | ✅         |
//! | macOS    | `diskutil -plist`                           | ✅         | ✅         |
//! | Windows  | WMI (`Win32_DiskDrive`, `Win32_DiskPartition`) | ✅      | ✅         |
//!
//! Enumeration distinguishes "no disks present" (`Ok` with an empty list)
//! from "the registry could not be opened" ([`Error::SourceUnavailable`]).

pub mod error;
mod source;
pub mod types;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

use std::path::Path;

pub use error::{Error, Result};
pub use types::{DeviceClass, Disk, DiskList, Removable};

/// Enumerate all block devices in the system.
///
/// Performs one blocking pass over the platform registry and returns the
/// devices in discovery order, without sorting or deduplication. Devices
/// that turn unreadable mid-pass are skipped; only an unopenable registry
/// fails the whole call.
pub fn enumerate_disks() -> Result<DiskList> {
    #[cfg(target_os = "linux")]
    {
        use crate::source::RawDeviceSource;
        linux::Source::open().map(source::collect_from)
    }

    #[cfg(target_os = "macos")]
    {
        use crate::source::RawDeviceSource;
        macos::Source::open().map(source::collect_from)
    }

    #[cfg(target_os = "windows")]
    {
        use crate::source::RawDeviceSource;
        windows::Source::open().map(source::collect_from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Err(Error::Unsupported(
            "device enumeration not supported on this platform".to_string(),
        ))
    }
}

/// Resolve a single path into a [`Disk`] record.
///
/// A block device node resolves through the same registry as
/// [`enumerate_disks`]. Any other existing path is treated as a disk image:
/// a [`DeviceClass::File`] record whose size, model, and removability are
/// unknown. A missing path is [`Error::NotFound`].
pub fn probe_path(path: impl AsRef<Path>) -> Result<Disk> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    #[cfg(unix)]
    if is_block_device(path)? {
        return block_device_record(path);
    }

    Ok(Disk {
        devnode: path.to_path_buf(),
        model: None,
        size: None,
        block_size: None,
        removable: Removable::Unknown,
        class: DeviceClass::File,
    })
}

#[cfg(unix)]
fn is_block_device(path: &Path) -> Result<bool> {
    use nix::sys::stat::{stat, SFlag};

    let st = stat(path).map_err(|e| std::io::Error::from_raw_os_error(e as i32))?;
    let mode = SFlag::from_bits_truncate(st.st_mode);
    Ok(mode & SFlag::S_IFMT == SFlag::S_IFBLK)
}

#[cfg(target_os = "linux")]
fn block_device_record(path: &Path) -> Result<Disk> {
    linux::probe(path)
}

#[cfg(target_os = "macos")]
fn block_device_record(path: &Path) -> Result<Disk> {
    macos::probe(path)
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
fn block_device_record(path: &Path) -> Result<Disk> {
    // No registry to consult, but the node itself proves the class
    Ok(Disk {
        devnode: path.to_path_buf(),
        model: None,
        size: None,
        block_size: None,
        removable: Removable::Unknown,
        class: DeviceClass::Disk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Option<DiskList> {
        match enumerate_disks() {
            Ok(list) => Some(list),
            // Hosts without an accessible registry can't run the live tests
            Err(Error::SourceUnavailable(_)) | Err(Error::Unsupported(_)) => None,
            Err(e) => panic!("enumeration failed: {}", e),
        }
    }

    #[test]
    fn every_devnode_is_non_empty() {
        let Some(list) = snapshot() else { return };
        for disk in &list {
            assert!(!disk.devnode.as_os_str().is_empty());
        }
    }

    #[test]
    fn enumeration_is_idempotent_under_stable_system() {
        let Some(first) = snapshot() else { return };
        let second = enumerate_disks().unwrap();
        assert_eq!(first.len(), second.len());

        // The two lists own their memory independently
        drop(first);
        for disk in &second {
            assert!(!disk.devnode.as_os_str().is_empty());
        }
    }

    #[test]
    fn probe_missing_path_is_not_found() {
        let err = probe_path("/definitely/not/a/real/path/anywhere").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn probe_plain_file_is_a_disk_image() {
        let path = std::env::temp_dir().join(format!("disklist-probe-{}", std::process::id()));
        std::fs::write(&path, b"not really an image").unwrap();

        let disk = probe_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(disk.devnode, path);
        assert_eq!(disk.class, DeviceClass::File);
        assert_eq!(disk.model, None);
        assert_eq!(disk.size, None);
        assert_eq!(disk.removable, Removable::Unknown);
    }
}
