use crate::input::FeatureDevice;
use std::io;

const REPORT_MODE: u8 = 0x22;
const MODE_REPORT_LEN: usize = 27;
const MODE_SIGNATURE: u8 = 0x14;
const MODE_TOUCH: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchModeOutcome {
    Enabled,
    AlreadyEnabled,
}

impl std::fmt::Display for TouchModeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TouchModeOutcome::Enabled => write!(f, "touch mode enabled"),
            TouchModeOutcome::AlreadyEnabled => write!(f, "touch mode already enabled"),
        }
    }
}

/// Switch the mouse into raw touch reporting via feature report 0x22.
///
/// The report is read back first; it is only written when the device is
/// not already streaming touch data.
pub fn enable_touch_mode<D: FeatureDevice + ?Sized>(dev: &D) -> io::Result<TouchModeOutcome> {
    let mut buf = [0u8; MODE_REPORT_LEN];
    buf[0] = REPORT_MODE;
    dev.get_feature(&mut buf)?;

    if buf[0] != REPORT_MODE || buf[1] != MODE_SIGNATURE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "unexpected mode report header {:02x} {:02x}",
                buf[0], buf[1]
            ),
        ));
    }

    buf[2] = 1;
    if buf[3] == 0 && buf[4] != MODE_TOUCH {
        buf[4] = MODE_TOUCH;
        dev.set_feature(&buf)?;
        Ok(TouchModeOutcome::Enabled)
    } else {
        Ok(TouchModeOutcome::AlreadyEnabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeDevice {
        report: [u8; MODE_REPORT_LEN],
        written: RefCell<Vec<Vec<u8>>>,
    }

    impl FakeDevice {
        fn with_report(head: &[u8]) -> Self {
            let mut report = [0u8; MODE_REPORT_LEN];
            report[..head.len()].copy_from_slice(head);
            Self {
                report,
                written: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeatureDevice for FakeDevice {
        fn set_feature(&self, buf: &[u8]) -> io::Result<()> {
            self.written.borrow_mut().push(buf.to_vec());
            Ok(())
        }

        fn get_feature(&self, buf: &mut [u8]) -> io::Result<usize> {
            assert_eq!(buf[0], REPORT_MODE);
            buf.copy_from_slice(&self.report);
            Ok(buf.len())
        }
    }

    #[test]
    fn writes_touch_mode_when_off() {
        let dev = FakeDevice::with_report(&[0x22, 0x14, 0x00, 0x00, 0x01, 0x00, 0x00, 0x03]);
        assert_eq!(enable_touch_mode(&dev).unwrap(), TouchModeOutcome::Enabled);

        let written = dev.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].len(), MODE_REPORT_LEN);
        assert_eq!(&written[0][..5], &[0x22, 0x14, 0x01, 0x00, 0x06]);
        assert_eq!(written[0][7], 0x03);
    }

    #[test]
    fn leaves_device_alone_when_already_on() {
        let dev = FakeDevice::with_report(&[0x22, 0x14, 0x01, 0x00, 0x06]);
        assert_eq!(
            enable_touch_mode(&dev).unwrap(),
            TouchModeOutcome::AlreadyEnabled
        );
        assert!(dev.written.borrow().is_empty());
    }

    #[test]
    fn nonzero_byte_three_skips_write() {
        let dev = FakeDevice::with_report(&[0x22, 0x14, 0x00, 0x01, 0x00]);
        assert_eq!(
            enable_touch_mode(&dev).unwrap(),
            TouchModeOutcome::AlreadyEnabled
        );
        assert!(dev.written.borrow().is_empty());
    }

    #[test]
    fn rejects_unknown_device() {
        let dev = FakeDevice::with_report(&[0x22, 0x20]);
        let err = enable_touch_mode(&dev).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(dev.written.borrow().is_empty());
    }
}
