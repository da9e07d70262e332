//! Canonical device records shared by every platform source

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Whether the medium behind a device can be physically removed.
///
/// Kept as a three-valued enum rather than a boolean because the registry
/// may be unable to answer the question for a given device. An unanswered
/// query must stay `Unknown`; it never decays to `No`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Removable {
    Yes,
    No,
    Unknown,
}

impl From<Option<bool>> for Removable {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for Removable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Removable::Yes => "yes",
                Removable::No => "no",
                Removable::Unknown => "unknown",
            }
        )
    }
}

/// Device classification
///
/// Platforms whose registry cannot distinguish these report every entry as
/// `Disk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Plain file treated as a disk image
    File,
    /// Whole disk
    Disk,
    /// Child slice of a whole disk
    Partition,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DeviceClass::File => "file",
                DeviceClass::Disk => "disk",
                DeviceClass::Partition => "partition",
            }
        )
    }
}

/// One discovered storage device or device-like file.
///
/// Every optional property is an `Option` resolved by the normalizer:
/// `None` means the registry could not supply the value, and consumers must
/// not substitute a default. There are no sentinel values — `size: None` is
/// the only representation of an unknown capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    /// Device node or file path. Always present and non-empty.
    pub devnode: PathBuf,
    /// Human-readable device model, if the registry supplies one.
    /// Never an empty string standing in for "no model".
    pub model: Option<String>,
    /// Capacity in bytes
    pub size: Option<u64>,
    /// Minimum addressable unit in bytes
    pub block_size: Option<u64>,
    /// Whether the medium is removable
    pub removable: Removable,
    /// File, whole disk, or partition
    pub class: DeviceClass,
}

/// Full enumeration result: `Disk` records in discovery order.
///
/// No sorting and no deduplication is applied; the order is exactly what the
/// platform registry yielded. The list owns all of its records and strings,
/// and nothing in this crate retains a reference to them after the
/// enumeration call returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiskList {
    disks: Vec<Disk>,
}

impl DiskList {
    /// Number of discovered devices
    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    /// Iterate over all records in discovery order
    pub fn iter(&self) -> std::slice::Iter<'_, Disk> {
        self.disks.iter()
    }

    /// Records whose medium is definitely removable.
    ///
    /// `Removable::Unknown` entries are excluded; callers wanting to offer
    /// those anyway should iterate the full list.
    pub fn removable(&self) -> impl Iterator<Item = &Disk> {
        self.disks.iter().filter(|d| d.removable == Removable::Yes)
    }

    pub fn as_slice(&self) -> &[Disk] {
        &self.disks
    }

    pub fn into_vec(self) -> Vec<Disk> {
        self.disks
    }
}

impl From<Vec<Disk>> for DiskList {
    fn from(disks: Vec<Disk>) -> Self {
        Self { disks }
    }
}

impl IntoIterator for DiskList {
    type Item = Disk;
    type IntoIter = std::vec::IntoIter<Disk>;

    fn into_iter(self) -> Self::IntoIter {
        self.disks.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiskList {
    type Item = &'a Disk;
    type IntoIter = std::slice::Iter<'a, Disk>;

    fn into_iter(self) -> Self::IntoIter {
        self.disks.iter()
    }
}
