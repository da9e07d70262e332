//! Source trait seam between platform registries and the canonical records
//!
//! Each platform module exposes a `Source` implementing [`RawDeviceSource`].
//! The conversion and accumulation logic here is platform-independent, so it
//! can be exercised with synthetic sources in tests.

use log::warn;

use crate::error::Result;
use crate::types::{DeviceClass, Disk, DiskList, Removable};

/// One raw device record as the platform registry reports it.
///
/// Accessors return `None` when the registry cannot answer; they never fail.
/// The only fallible step is producing the record itself (see
/// [`RawDeviceSource`]).
pub(crate) trait RawDevice {
    /// Device node or file path. The one property every registry must supply.
    fn devnode(&self) -> std::path::PathBuf;

    fn model(&self) -> Option<String>;

    fn size_bytes(&self) -> Option<u64>;

    fn block_size(&self) -> Option<u64>;

    /// `None` when the registry errored or the property is not applicable.
    fn removable(&self) -> Option<bool>;

    /// `None` when the platform cannot distinguish device classes.
    fn class(&self) -> Option<DeviceClass>;
}

/// A platform device registry opened for one enumeration pass.
///
/// `open` failing means the registry itself is unavailable and the whole
/// call errors; a failed item in `devices` means one device vanished or
/// turned unreadable mid-pass and only that entry is dropped.
pub(crate) trait RawDeviceSource: Sized {
    type Device: RawDevice;
    type Iter: IntoIterator<Item = Result<Self::Device>>;

    fn open() -> Result<Self>;

    fn devices(self) -> Self::Iter;
}

/// Classification rule shared by all platforms: file backing wins, then
/// parent linkage, and a device with neither is a whole disk.
pub(crate) fn classify(has_parent: bool, file_backed: bool) -> DeviceClass {
    if file_backed {
        DeviceClass::File
    } else if has_parent {
        DeviceClass::Partition
    } else {
        DeviceClass::Disk
    }
}

/// Resolve one raw record into a canonical [`Disk`].
///
/// Never fails: an unanswered accessor leaves the matching field in its
/// unknown state and every field resolves independently of the others.
pub(crate) fn normalize<D: RawDevice>(dev: &D) -> Disk {
    Disk {
        devnode: dev.devnode(),
        model: dev.model().filter(|m| !m.is_empty()),
        size: dev.size_bytes(),
        block_size: dev.block_size(),
        removable: Removable::from(dev.removable()),
        class: dev.class().unwrap_or(DeviceClass::Disk),
    }
}

/// Drive one full pass over an opened source.
pub(crate) fn collect_from<S: RawDeviceSource>(source: S) -> DiskList {
    let mut disks = Vec::new();
    for item in source.devices() {
        match item {
            Ok(dev) => disks.push(normalize(&dev)),
            Err(e) => warn!("skipping device that became unreadable: {}", e),
        }
    }
    DiskList::from(disks)
}
