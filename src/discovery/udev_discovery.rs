use super::{is_touch_mouse_hid, DeviceDiscovery, DeviceInfo, DiscoveryError};
use std::path::PathBuf;

pub struct UdevDiscovery;

impl DeviceDiscovery for UdevDiscovery {
    fn find_touch_mice() -> Result<Vec<DeviceInfo>, DiscoveryError> {
        let mut enumerator =
            udev::Enumerator::new().map_err(|e| DiscoveryError::UdevError(e.to_string()))?;

        enumerator
            .match_subsystem("hidraw")
            .map_err(|e| DiscoveryError::UdevError(e.to_string()))?;

        let mut results = Vec::new();

        for device in enumerator
            .scan_devices()
            .map_err(|e| DiscoveryError::UdevError(e.to_string()))?
        {
            let Some(devnode) = device.devnode() else {
                continue;
            };

            let hid = match device.parent_with_subsystem("hid") {
                Ok(Some(hid)) => hid,
                Ok(None) => continue,
                Err(e) => return Err(DiscoveryError::UdevError(e.to_string())),
            };

            let sysname = hid.sysname().to_string_lossy();
            if is_touch_mouse_hid(&sysname) {
                log::debug!("{} belongs to {}", devnode.display(), sysname);
                results.push(DeviceInfo {
                    devnode: PathBuf::from(devnode),
                });
            }
        }

        results.sort_by(|a, b| a.devnode.cmp(&b.devnode));

        if results.is_empty() {
            Err(DiscoveryError::NotFound)
        } else {
            Ok(results)
        }
    }
}
