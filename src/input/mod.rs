#[cfg(target_os = "linux")]
pub mod hidraw_backend;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The byte source cannot supply the requested bytes. Always fatal for the
/// decode loop.
#[derive(Debug)]
pub enum StreamFault {
    Closed,
    Io(io::Error),
    Oversized { data_length: u8 },
}

impl std::fmt::Display for StreamFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamFault::Closed => write!(f, "stream closed"),
            StreamFault::Io(e) => write!(f, "read error: {}", e),
            StreamFault::Oversized { data_length } => {
                write!(f, "payload length {} overruns the report", data_length)
            }
        }
    }
}

impl std::error::Error for StreamFault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamFault::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StreamFault {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            StreamFault::Closed
        } else {
            StreamFault::Io(e)
        }
    }
}

/// Why a read returned without data.
#[derive(Debug)]
pub enum SourceError {
    /// The stop signal was raised. Not a failure.
    Stopped,
    Fault(StreamFault),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Stopped => write!(f, "stopped"),
            SourceError::Fault(fault) => write!(f, "{}", fault),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<StreamFault> for SourceError {
    fn from(fault: StreamFault) -> Self {
        SourceError::Fault(fault)
    }
}

/// Cloneable flag used to ask a worker to wind down.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A sequential byte source that can fill a buffer completely or fail.
pub trait ByteSource {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SourceError>;

    fn read_byte(&mut self) -> Result<u8, SourceError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

impl ByteSource for &[u8] {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        io::Read::read_exact(self, buf).map_err(|e| SourceError::Fault(e.into()))
    }
}

/// HID feature report access, used to switch the device into touch mode.
pub trait FeatureDevice {
    fn set_feature(&self, buf: &[u8]) -> io::Result<()>;
    fn get_feature(&self, buf: &mut [u8]) -> io::Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_reads_then_closes() {
        let mut src: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 2];
        src.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.read_byte().unwrap(), 3);
        assert!(matches!(
            src.read_byte(),
            Err(SourceError::Fault(StreamFault::Closed))
        ));
    }

    #[test]
    fn short_read_is_closed_fault() {
        let mut src: &[u8] = &[1];
        let mut buf = [0u8; 4];
        assert!(matches!(
            src.read_exact(&mut buf),
            Err(SourceError::Fault(StreamFault::Closed))
        ));
    }

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let stop = StopSignal::new();
        let other = stop.clone();
        assert!(!other.is_raised());
        stop.raise();
        assert!(other.is_raised());
    }
}
