use crate::input::{ByteSource, SourceError};

pub const MARKER_TOUCH: u8 = 0x27;
pub const MARKER_CONTACT: u8 = 0x21;

pub const REPORT_LEN: usize = 32;
pub const TOUCH_FOOTER: u8 = 0x51;

const OFFSET_DATA_LENGTH: usize = 1;
const OFFSET_FOOTER: usize = 5;
const OFFSET_TIMESTAMP: usize = 6;
pub const OFFSET_PAYLOAD: usize = 7;

/// One touch-scan report as read off the wire, marker byte included.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawReport([u8; REPORT_LEN]);

impl RawReport {
    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.0
    }

    pub fn data_length(&self) -> u8 {
        self.0[OFFSET_DATA_LENGTH]
    }

    pub fn footer(&self) -> u8 {
        self.0[OFFSET_FOOTER]
    }

    pub fn timestamp(&self) -> u8 {
        self.0[OFFSET_TIMESTAMP]
    }

    /// Space separated lowercase hex, e.g. `27 03 00 ...`.
    pub fn hex_dump(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Debug for RawReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawReport({})", self.hex_dump())
    }
}

/// The two bytes trailing a contact marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFields(pub u8, pub u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Touch(RawReport),
    Contact(ContactFields),
    /// A byte that is not a known marker. Already discarded.
    Unrecognized(u8),
}

/// Read the next report from `src`.
///
/// Reads one marker byte, then exactly the trailing bytes that marker
/// defines. Unknown markers consume only themselves so the caller can
/// resynchronize byte by byte.
pub fn next_report<S: ByteSource + ?Sized>(src: &mut S) -> Result<Report, SourceError> {
    let marker = src.read_byte()?;
    match marker {
        MARKER_TOUCH => {
            let mut buf = [0u8; REPORT_LEN];
            buf[0] = MARKER_TOUCH;
            src.read_exact(&mut buf[1..])?;
            Ok(Report::Touch(RawReport(buf)))
        }
        MARKER_CONTACT => {
            let mut buf = [0u8; 2];
            src.read_exact(&mut buf)?;
            Ok(Report::Contact(ContactFields(buf[0], buf[1])))
        }
        other => Ok(Report::Unrecognized(other)),
    }
}

#[cfg(test)]
pub(crate) fn touch_report(
    data_length: u8,
    footer: u8,
    timestamp: u8,
    payload: &[u8],
) -> RawReport {
    let mut buf = [0u8; REPORT_LEN];
    buf[0] = MARKER_TOUCH;
    buf[OFFSET_DATA_LENGTH] = data_length;
    buf[OFFSET_FOOTER] = footer;
    buf[OFFSET_TIMESTAMP] = timestamp;
    buf[OFFSET_PAYLOAD..OFFSET_PAYLOAD + payload.len()].copy_from_slice(payload);
    RawReport(buf)
}
