//! macOS device source backed by `diskutil`
//!
//! One `diskutil list -plist` yields the BSD names of every disk and
//! partition; each name is then resolved with `diskutil info -plist`, which
//! reports media name, sizes, removability, and whether the entry is a
//! whole disk or a slice of one. Disk images surface as `Virtual` media.

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::source::{classify, normalize, RawDevice, RawDeviceSource};
use crate::types::{DeviceClass, Disk};

/// `diskutil list -plist` output, reduced to the fields consumed here
#[derive(Debug, Deserialize)]
struct ListOutput {
    #[serde(rename = "AllDisks", default)]
    all_disks: Vec<String>,
}

/// `diskutil info -plist <dev>` output, reduced to the fields consumed here
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InfoOutput {
    #[serde(rename = "DeviceNode")]
    device_node: Option<String>,
    #[serde(rename = "MediaName")]
    media_name: Option<String>,
    #[serde(rename = "TotalSize")]
    total_size: Option<u64>,
    #[serde(rename = "Size")]
    size: Option<u64>,
    #[serde(rename = "DeviceBlockSize")]
    device_block_size: Option<u64>,
    #[serde(rename = "Removable")]
    removable: Option<bool>,
    #[serde(rename = "RemovableMedia")]
    removable_media: Option<bool>,
    #[serde(rename = "RemovableMediaOrExternalDevice")]
    removable_or_external: Option<bool>,
    #[serde(rename = "WholeDisk")]
    whole_disk: Option<bool>,
    #[serde(rename = "VirtualOrPhysical")]
    virtual_or_physical: Option<String>,
}

/// One resolved diskutil entry
pub(crate) struct MacDevice {
    bsd_name: String,
    info: InfoOutput,
}

impl MacDevice {
    fn query(bsd_name: &str) -> Result<Self> {
        let output = Command::new("diskutil")
            .args(["info", "-plist", bsd_name])
            .output()?;
        if !output.status.success() {
            return Err(Error::Parse(format!(
                "diskutil info {} exited with {}",
                bsd_name, output.status
            )));
        }
        let info = parse_info(&output.stdout)?;
        Ok(Self {
            bsd_name: bsd_name.to_owned(),
            info,
        })
    }
}

fn parse_info(bytes: &[u8]) -> Result<InfoOutput> {
    plist::from_bytes(bytes).map_err(|e| Error::Parse(format!("diskutil info plist: {}", e)))
}

fn parse_list(bytes: &[u8]) -> Result<ListOutput> {
    plist::from_bytes(bytes).map_err(|e| Error::Parse(format!("diskutil list plist: {}", e)))
}

impl RawDevice for MacDevice {
    fn devnode(&self) -> PathBuf {
        match &self.info.device_node {
            Some(node) => PathBuf::from(node),
            None => PathBuf::from("/dev").join(&self.bsd_name),
        }
    }

    fn model(&self) -> Option<String> {
        self.info
            .media_name
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
    }

    fn size_bytes(&self) -> Option<u64> {
        self.info.total_size.or(self.info.size)
    }

    fn block_size(&self) -> Option<u64> {
        self.info.device_block_size
    }

    fn removable(&self) -> Option<bool> {
        self.info
            .removable
            .or(self.info.removable_media)
            .or(self.info.removable_or_external)
    }

    fn class(&self) -> Option<DeviceClass> {
        let file_backed = self.info.virtual_or_physical.as_deref() == Some("Virtual");
        let has_parent = match self.info.whole_disk {
            Some(whole) => !whole,
            // Without the WholeDisk key the registry cannot place this entry
            None if !file_backed => return None,
            None => false,
        };
        Some(classify(has_parent, file_backed))
    }
}

/// One `diskutil list` inventory opened for a pass
pub(crate) struct Source {
    all_disks: Vec<String>,
}

impl RawDeviceSource for Source {
    type Device = MacDevice;
    type Iter = Vec<Result<MacDevice>>;

    fn open() -> Result<Self> {
        let output = Command::new("diskutil")
            .args(["list", "-plist"])
            .output()
            .map_err(|e| Error::SourceUnavailable(format!("diskutil: {}", e)))?;
        if !output.status.success() {
            return Err(Error::SourceUnavailable(format!(
                "diskutil list exited with {}",
                output.status
            )));
        }
        let list = parse_list(&output.stdout)
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;
        Ok(Self {
            all_disks: list.all_disks,
        })
    }

    fn devices(self) -> Self::Iter {
        self.all_disks
            .iter()
            .map(|name| MacDevice::query(name))
            .collect()
    }
}

/// Resolve one block device node through diskutil
pub(crate) fn probe(devnode: &std::path::Path) -> Result<Disk> {
    let name = devnode
        .to_str()
        .ok_or_else(|| Error::NotFound(devnode.to_path_buf()))?;
    let dev = MacDevice::query(name)?;
    Ok(normalize(&dev))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>DeviceNode</key><string>/dev/disk2s1</string>
    <key>MediaName</key><string>SanDisk Ultra</string>
    <key>TotalSize</key><integer>62008590336</integer>
    <key>DeviceBlockSize</key><integer>512</integer>
    <key>Removable</key><true/>
    <key>WholeDisk</key><false/>
    <key>VirtualOrPhysical</key><string>Physical</string>
</dict>
</plist>"#;

    const LIST_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>AllDisks</key>
    <array>
        <string>disk0</string>
        <string>disk0s1</string>
        <string>disk2</string>
    </array>
</dict>
</plist>"#;

    #[test]
    fn info_plist_resolves_every_field() {
        let dev = MacDevice {
            bsd_name: "disk2s1".into(),
            info: parse_info(INFO_PLIST.as_bytes()).unwrap(),
        };
        assert_eq!(dev.devnode(), PathBuf::from("/dev/disk2s1"));
        assert_eq!(dev.model().as_deref(), Some("SanDisk Ultra"));
        assert_eq!(dev.size_bytes(), Some(62_008_590_336));
        assert_eq!(dev.block_size(), Some(512));
        assert_eq!(dev.removable(), Some(true));
        assert_eq!(dev.class(), Some(DeviceClass::Partition));
    }

    #[test]
    fn bare_info_keeps_everything_unknown() {
        let dev = MacDevice {
            bsd_name: "disk9".into(),
            info: parse_info(
                br#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0"><dict/></plist>"#,
            )
            .unwrap(),
        };
        assert_eq!(dev.devnode(), PathBuf::from("/dev/disk9"));
        assert_eq!(dev.model(), None);
        assert_eq!(dev.size_bytes(), None);
        assert_eq!(dev.removable(), None);
        assert_eq!(dev.class(), None);
    }

    #[test]
    fn virtual_media_is_file_backed() {
        let mut info = parse_info(INFO_PLIST.as_bytes()).unwrap();
        info.virtual_or_physical = Some("Virtual".into());
        let dev = MacDevice {
            bsd_name: "disk5".into(),
            info,
        };
        assert_eq!(dev.class(), Some(DeviceClass::File));
    }

    #[test]
    fn list_plist_yields_bsd_names() {
        let list = parse_list(LIST_PLIST.as_bytes()).unwrap();
        assert_eq!(list.all_disks, vec!["disk0", "disk0s1", "disk2"]);
    }
}
