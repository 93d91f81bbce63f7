use super::{ByteSource, FeatureDevice, SourceError, StopSignal, StreamFault};
use std::fs::OpenOptions;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

// HIDRAW ioctl numbers computed from the Linux _IOC macro:
//   _IOC(dir, type, nr, size) = (dir << 30) | (size << 16) | (type << 8) | nr
//   HIDIOCSFEATURE = _IOC(_IOC_WRITE|_IOC_READ, 'H', 0x06, len)
//   HIDIOCGFEATURE = _IOC(_IOC_WRITE|_IOC_READ, 'H', 0x07, len)

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

/// How long a single poll(2) waits before the stop signal is rechecked.
const POLL_SLICE_MS: libc::c_int = 100;

/// Larger than any report the mouse sends; hidraw truncates reads to this.
const READ_BUF_LEN: usize = 64;

const fn ioc(dir: u32, ty: u32, nr: u32, size: u32) -> libc::c_ulong {
    ((dir << 30) | (size << 16) | (ty << 8) | nr) as libc::c_ulong
}

fn hidiocsfeature(len: u32) -> libc::c_ulong {
    ioc(IOC_WRITE | IOC_READ, b'H' as u32, 0x06, len)
}

fn hidiocgfeature(len: u32) -> libc::c_ulong {
    ioc(IOC_WRITE | IOC_READ, b'H' as u32, 0x07, len)
}

pub struct HidrawDevice {
    fd: OwnedFd,
}

impl HidrawDevice {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self {
            fd: OwnedFd::from(file),
        })
    }

    /// Wait up to `timeout_ms` for input. Returns false on timeout.
    ///
    /// A hang-up counts as readable so that buffered input is still
    /// delivered; the read after it reports the end of the stream.
    fn wait_readable(&self, timeout_ms: libc::c_int) -> io::Result<bool> {
        let mut pollfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ret = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        if pollfd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "hidraw descriptor is not open",
            ));
        }
        Ok(ret > 0)
    }

    /// One read(2) returns at most one whole report.
    fn read_report(&self, buf: &mut [u8]) -> io::Result<usize> {
        let ret = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(ret as usize)
        }
    }
}

impl FeatureDevice for HidrawDevice {
    fn set_feature(&self, buf: &[u8]) -> io::Result<()> {
        let ret = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                hidiocsfeature(buf.len() as u32),
                buf.as_ptr(),
            )
        };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    fn get_feature(&self, buf: &mut [u8]) -> io::Result<usize> {
        let ret = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                hidiocgfeature(buf.len() as u32),
                buf.as_mut_ptr(),
            )
        };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(ret as usize)
        }
    }
}

/// Byte-stream view over a hidraw node. Reports are read whole and handed
/// out byte by byte; waiting is sliced so a raised stop signal is noticed
/// within one poll slice.
pub struct HidrawSource {
    dev: HidrawDevice,
    stop: StopSignal,
    buf: [u8; READ_BUF_LEN],
    pos: usize,
    len: usize,
}

impl HidrawSource {
    pub fn new(dev: HidrawDevice, stop: StopSignal) -> Self {
        Self {
            dev,
            stop,
            buf: [0; READ_BUF_LEN],
            pos: 0,
            len: 0,
        }
    }

    pub fn open(path: &Path, stop: StopSignal) -> io::Result<Self> {
        Ok(Self::new(HidrawDevice::open(path)?, stop))
    }

    fn refill(&mut self) -> Result<(), SourceError> {
        loop {
            if self.stop.is_raised() {
                return Err(SourceError::Stopped);
            }
            match self.dev.wait_readable(POLL_SLICE_MS) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => return Err(StreamFault::Io(e).into()),
            }
            match self.dev.read_report(&mut self.buf) {
                Ok(0) => return Err(StreamFault::Closed.into()),
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(());
                }
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamFault::Io(e).into()),
            }
        }
    }
}

impl ByteSource for HidrawSource {
    fn read_exact(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
        let mut filled = 0;
        while filled < out.len() {
            if self.pos == self.len {
                self.refill()?;
            }
            let take = (out.len() - filled).min(self.len - self.pos);
            let chunk = &self.buf[self.pos..self.pos + take];
            out[filled..filled + take].copy_from_slice(chunk);
            self.pos += take;
            filled += take;
        }
        Ok(())
    }
}

impl FeatureDevice for HidrawSource {
    fn set_feature(&self, buf: &[u8]) -> io::Result<()> {
        self.dev.set_feature(buf)
    }

    fn get_feature(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.dev.get_feature(buf)
    }
}
