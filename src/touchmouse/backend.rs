use super::contact::{decode_contact, ContactEvent};
use super::decoder::{DecodeOutcome, DecodeSession};
use super::grid::{Latest, SharedGrid};
use super::protocol::{next_report, RawReport, Report};
use crate::input::{ByteSource, SourceError, StopSignal, StreamFault};
use std::io;
use std::sync::mpsc;
use std::thread;

/// Contact transitions held for a reader before new ones are dropped.
pub const CONTACT_QUEUE_LEN: usize = 64;

/// State the decoder thread overwrites in place. Readers only ever see the
/// newest values, so an idle reader costs nothing.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub grid: SharedGrid,
    /// The last touch report that was applied to the grid.
    pub last_report: Latest<Option<RawReport>>,
    pub contact: Latest<Option<ContactEvent>>,
}

/// Read, decode and publish reports until the source closes, faults or the
/// stop signal is raised. A stop is a clean exit.
pub fn run_decoder<S: ByteSource + ?Sized>(
    src: &mut S,
    session: &mut DecodeSession,
    out: &Published,
    tx: &mpsc::SyncSender<ContactEvent>,
    stop: &StopSignal,
) -> Result<(), StreamFault> {
    while !stop.is_raised() {
        let report = match next_report(src) {
            Ok(r) => r,
            Err(SourceError::Stopped) => break,
            Err(SourceError::Fault(fault)) => return Err(fault),
        };

        match report {
            Report::Touch(raw) => match session.decode(&raw)? {
                DecodeOutcome::Applied { new_frame } => {
                    if new_frame {
                        log::trace!("new frame, timestamp {}", raw.timestamp());
                    }
                    out.grid.publish(session.grid());
                    out.last_report.publish(&Some(raw));
                }
                DecodeOutcome::Dropped { footer } => {
                    log::debug!("dropping report with footer {:#04x}", footer);
                }
            },
            Report::Contact(fields) => {
                let event = decode_contact(fields);
                log::debug!("finger {}", if event.pressed { "down" } else { "up" });
                out.contact.publish(&Some(event));
                match tx.try_send(event) {
                    Ok(()) => {}
                    Err(mpsc::TrySendError::Full(_)) => {
                        log::debug!("contact queue full, dropping transition");
                    }
                    // The reader may have gone away; decoding carries on regardless.
                    Err(mpsc::TrySendError::Disconnected(_)) => {}
                }
            }
            Report::Unrecognized(marker) => {
                log::warn!("unknown marker {:#04x}", marker);
            }
        }
    }
    Ok(())
}

/// Owner's side of a running decoder thread.
pub struct DecoderHandle {
    pub published: Published,
    /// Finger down/up transitions, one per contact report, bounded by
    /// [`CONTACT_QUEUE_LEN`].
    pub events: mpsc::Receiver<ContactEvent>,
    stop: StopSignal,
    thread: Option<thread::JoinHandle<Result<(), StreamFault>>>,
}

impl DecoderHandle {
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Ask the thread to stop and wait for its result.
    pub fn stop_and_join(&mut self) -> Result<(), StreamFault> {
        self.stop.raise();
        match self.thread.take() {
            Some(t) => t.join().unwrap_or_else(|_| {
                Err(StreamFault::Io(io::Error::other("decoder thread panicked")))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for DecoderHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop_and_join() {
            log::error!("decoder: {}", e);
        }
    }
}

/// Spawn a background thread that decodes `src` and publishes grids.
///
/// `stop` must be the same signal the source watches, if it watches one.
pub fn spawn_decoder_thread<S>(mut src: S, stop: StopSignal) -> DecoderHandle
where
    S: ByteSource + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(CONTACT_QUEUE_LEN);
    let published = Published::default();

    let out = published.clone();
    let th_stop = stop.clone();
    let thread = thread::spawn(move || {
        let mut session = DecodeSession::new();
        let result = run_decoder(&mut src, &mut session, &out, &tx, &th_stop);
        match &result {
            Ok(()) => log::info!("decoder: stopped"),
            Err(e) => log::error!("decoder: {}", e),
        }
        result
    });

    DecoderHandle {
        published,
        events: rx,
        stop,
        thread: Some(thread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touchmouse::protocol::{touch_report, TOUCH_FOOTER};
    use std::time::{Duration, Instant};

    const PRESS: [u8; 3] = [0x21, 0x00, 0x02];
    const RELEASE: [u8; 3] = [0x21, 0x00, 0x00];

    fn run(bytes: &[u8]) -> (Result<(), StreamFault>, Published, Vec<ContactEvent>) {
        let mut src: &[u8] = bytes;
        let mut session = DecodeSession::new();
        let out = Published::default();
        let (tx, rx) = mpsc::sync_channel(CONTACT_QUEUE_LEN);
        let result = run_decoder(&mut src, &mut session, &out, &tx, &StopSignal::new());
        (result, out, rx.try_iter().collect())
    }

    #[test]
    fn decodes_mixed_stream_until_close() {
        let touch = touch_report(3, TOUCH_FOOTER, 1, &[0x00, 0xF3]);
        let bytes = [&[0x99u8][..], &PRESS[..], touch.as_bytes(), &RELEASE[..]].concat();

        let (result, out, events) = run(&bytes);
        assert!(matches!(result, Err(StreamFault::Closed)));
        assert_eq!(out.grid.snapshot().get(5, 0), 51);
        assert_eq!(*out.last_report.snapshot(), Some(touch));

        assert_eq!(
            events,
            vec![
                ContactEvent { pressed: true },
                ContactEvent { pressed: false }
            ]
        );
        assert_eq!(
            *out.contact.snapshot(),
            Some(ContactEvent { pressed: false })
        );
    }

    #[test]
    fn dropped_report_is_not_published() {
        let good = touch_report(2, TOUCH_FOOTER, 1, &[0x07]);
        let bad = touch_report(2, 0x00, 2, &[0x0E]);
        let bytes = [&good.as_bytes()[..], &bad.as_bytes()[..]].concat();

        let (_, out, events) = run(&bytes);
        assert_eq!(out.grid.snapshot().get(3, 0), 119);
        assert_eq!(*out.last_report.snapshot(), Some(good));
        assert!(events.is_empty());
    }

    #[test]
    fn undrained_reader_stays_bounded() {
        let reports: Vec<RawReport> = (0..5000u32)
            .map(|i| touch_report(2, TOUCH_FOOTER, (i % 256) as u8, &[(i % 15) as u8]))
            .collect();
        let mut bytes = Vec::new();
        for (i, report) in reports.iter().enumerate() {
            bytes.extend_from_slice(report.as_bytes());
            bytes.extend_from_slice(if i % 2 == 0 { &PRESS } else { &RELEASE });
        }

        let (result, out, events) = run(&bytes);
        assert!(matches!(result, Err(StreamFault::Closed)));
        assert_eq!(events.len(), CONTACT_QUEUE_LEN);
        assert_eq!(*out.last_report.snapshot(), reports.last().copied());
        // The newest state survives even though later transitions were dropped.
        assert_eq!(
            *out.contact.snapshot(),
            Some(ContactEvent { pressed: false })
        );
    }

    #[test]
    fn oversized_report_stops_the_loop() {
        let bad = touch_report(40, TOUCH_FOOTER, 2, &[]);
        let bytes = [bad.as_bytes(), &PRESS[..]].concat();

        let (result, out, events) = run(&bytes);
        assert!(matches!(
            result,
            Err(StreamFault::Oversized { data_length: 40 })
        ));
        assert!(out.grid.snapshot().is_blank());
        assert_eq!(*out.last_report.snapshot(), None);
        assert!(events.is_empty());
    }

    #[test]
    fn raised_stop_returns_before_reading() {
        let touch = touch_report(2, TOUCH_FOOTER, 1, &[0x07]);
        let mut src: &[u8] = touch.as_bytes();
        let stop = StopSignal::new();
        stop.raise();
        let (tx, _rx) = mpsc::sync_channel(1);
        let result = run_decoder(
            &mut src,
            &mut DecodeSession::new(),
            &Published::default(),
            &tx,
            &stop,
        );
        assert!(result.is_ok());
        assert_eq!(src.len(), 32);
    }

    /// Blocks until the stop signal is raised, like an idle device.
    struct IdleSource(StopSignal);

    impl ByteSource for IdleSource {
        fn read_exact(&mut self, _buf: &mut [u8]) -> Result<(), SourceError> {
            while !self.0.is_raised() {
                thread::sleep(Duration::from_millis(5));
            }
            Err(SourceError::Stopped)
        }
    }

    #[test]
    fn thread_stops_cleanly_while_idle() {
        let stop = StopSignal::new();
        let mut handle = spawn_decoder_thread(IdleSource(stop.clone()), stop);
        assert!(!handle.is_finished());
        assert!(handle.stop_and_join().is_ok());
        assert!(handle.is_finished());
    }

    #[test]
    fn thread_surfaces_fault() {
        let bytes: &'static [u8] = &[0x27, 0x03];
        let mut handle = spawn_decoder_thread(bytes, StopSignal::new());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(handle.stop_and_join(), Err(StreamFault::Closed)));
    }
}
