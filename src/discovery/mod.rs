#[cfg(target_os = "linux")]
pub mod udev_discovery;

use crate::touchmouse::{PRODUCT_ID, VENDOR_ID};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub devnode: PathBuf,
}

#[derive(Debug)]
pub enum DiscoveryError {
    UdevError(String),
    NotFound,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::UdevError(msg) => write!(f, "udev error: {}", msg),
            DiscoveryError::NotFound => write!(f, "no Touch Mouse found"),
        }
    }
}

impl std::error::Error for DiscoveryError {}

pub trait DeviceDiscovery {
    /// All hidraw nodes belonging to a Touch Mouse, sorted by devnode.
    fn find_touch_mice() -> Result<Vec<DeviceInfo>, DiscoveryError>;
}

/// The node to read when several interfaces match. The most recently
/// enumerated interface carries the touch reports.
pub fn pick_device(mut devices: Vec<DeviceInfo>) -> Result<PathBuf, DiscoveryError> {
    devices
        .pop()
        .map(|d| d.devnode)
        .ok_or(DiscoveryError::NotFound)
}

/// Match a HID sysfs name such as `0005:045E:0773.0003`.
pub fn is_touch_mouse_hid(sysname: &str) -> bool {
    let mut fields = sysname.split(':');
    let (Some(bus), Some(vendor), Some(rest), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return false;
    };
    let Some((product, instance)) = rest.split_once('.') else {
        return false;
    };

    let is_hex = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit());
    if ![bus, vendor, product, instance].into_iter().all(is_hex) {
        return false;
    }

    u16::from_str_radix(vendor, 16) == Ok(VENDOR_ID)
        && u16::from_str_radix(product, 16) == Ok(PRODUCT_ID)
}
