//! Linux device source backed by sysfs
//!
//! Walks `/sys/class/block`, which lists whole disks and partitions as flat
//! entries. Loop devices carry a `loop/backing_file` attribute pointing at
//! the image file; partitions carry a `partition` attribute.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::source::{classify, normalize, RawDevice, RawDeviceSource};
use crate::types::{DeviceClass, Disk};

const SYS_BLOCK: &str = "/sys/class/block";

/// One sysfs block device entry
#[derive(Debug)]
pub(crate) struct LinuxDevice {
    devnode: PathBuf,
    sysnode: PathBuf,
}

impl LinuxDevice {
    fn from_dev_name(name: &OsStr) -> Result<Self> {
        let devnode = PathBuf::from("/dev").join(name);
        if !devnode.exists() {
            return Err(Error::NotFound(devnode));
        }

        Ok(Self {
            devnode,
            sysnode: Path::new(SYS_BLOCK).join(name),
        })
    }

    /// Read a sysfs attribute, treating any unreadable attribute as absent
    fn read_attr(&self, attr: &str) -> Option<String> {
        fs::read_to_string(self.sysnode.join(attr))
            .ok()
            .map(|s| s.trim().to_owned())
    }
}

impl RawDevice for LinuxDevice {
    fn devnode(&self) -> PathBuf {
        self.devnode.clone()
    }

    fn model(&self) -> Option<String> {
        self.read_attr("device/model").filter(|m| !m.is_empty())
    }

    fn size_bytes(&self) -> Option<u64> {
        self.read_attr("size").and_then(|s| parse_sectors(&s))
    }

    fn block_size(&self) -> Option<u64> {
        // Partitions have no queue/ directory; the attribute is simply absent
        self.read_attr("queue/logical_block_size")
            .and_then(|s| s.parse().ok())
    }

    fn removable(&self) -> Option<bool> {
        self.read_attr("removable")
            .and_then(|s| parse_removable(&s))
    }

    fn class(&self) -> Option<DeviceClass> {
        let is_partition = self.sysnode.join("partition").exists();
        let file_backed = self.sysnode.join("loop/backing_file").exists();
        Some(classify(is_partition, file_backed))
    }
}

/// The sysfs `size` attribute counts 512-byte sectors regardless of the
/// device's own block size.
fn parse_sectors(s: &str) -> Option<u64> {
    s.parse::<u64>().ok().map(|n| n * 512)
}

fn parse_removable(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// `/sys/class/block` opened for one pass
pub(crate) struct Source {
    dir: fs::ReadDir,
}

impl RawDeviceSource for Source {
    type Device = LinuxDevice;
    type Iter = Vec<Result<LinuxDevice>>;

    fn open() -> Result<Self> {
        let dir = fs::read_dir(SYS_BLOCK)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", SYS_BLOCK, e)))?;
        Ok(Self { dir })
    }

    fn devices(self) -> Self::Iter {
        self.dir
            .map(|entry| {
                let entry = entry?;
                LinuxDevice::from_dev_name(&entry.file_name())
            })
            .collect()
    }
}

/// Resolve one block device node through sysfs
pub(crate) fn probe(devnode: &Path) -> Result<Disk> {
    let name = devnode
        .file_name()
        .ok_or_else(|| Error::NotFound(devnode.to_path_buf()))?;
    let dev = LinuxDevice::from_dev_name(name)?;
    Ok(normalize(&dev))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sectors_scale_to_bytes() {
        assert_eq!(parse_sectors("976773168"), Some(976773168 * 512));
        assert_eq!(parse_sectors("0"), Some(0));
        assert_eq!(parse_sectors("not a number"), None);
    }

    #[test]
    fn removable_attr_is_tri_state() {
        assert_eq!(parse_removable("0"), Some(false));
        assert_eq!(parse_removable("1"), Some(true));
        assert_eq!(parse_removable("2"), None);
        assert_eq!(parse_removable(""), None);
    }

    #[test]
    fn missing_device_is_not_found() {
        let err = LinuxDevice::from_dev_name(OsStr::new("no-such-device-zzz")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
