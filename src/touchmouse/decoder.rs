//! Touch-scan payload decoding.
//!
//! The payload is a nibble stream, low nibble of each byte first. A nibble
//! of 0xF is a skip marker: the nibble after it says how many cells to pass
//! over, minus three. Any other nibble is the intensity of the cell under
//! the cursor, scaled from 4 to 8 bits.

use super::grid::Grid;
use super::protocol::{RawReport, OFFSET_PAYLOAD, REPORT_LEN, TOUCH_FOOTER};
use super::walker::Cursor;
use crate::input::StreamFault;

const SKIP_MARKER: u8 = 0xF;
const SKIP_BIAS: usize = 3;

/// Scale a 4-bit sample to 8 bits.
pub fn intensity(nibble: u8) -> u8 {
    (255 * nibble as u16 / 15) as u8
}

/// Feed a single nibble through the state machine.
///
/// Returns the new cursor and, for in-grid samples, the `(x, y, value)`
/// to store.
pub fn step(cursor: Cursor, nibble: u8) -> (Cursor, Option<(usize, usize, u8)>) {
    if cursor.pending_skip {
        let cleared = Cursor {
            pending_skip: false,
            ..cursor
        };
        (cleared.advance_by(nibble as usize + SKIP_BIAS), None)
    } else if nibble == SKIP_MARKER {
        (
            Cursor {
                pending_skip: true,
                ..cursor
            },
            None,
        )
    } else {
        let write = cursor
            .in_grid()
            .then(|| (cursor.x, cursor.y, intensity(nibble)));
        (cursor.advance(), write)
    }
}

/// Payload bytes split into nibbles, low nibble first.
pub fn nibbles(payload: &[u8]) -> impl Iterator<Item = u8> + '_ {
    payload.iter().flat_map(|&b| [b & 0x0F, b >> 4])
}

/// The payload slice of a report, `data_length - 1` bytes from offset 7.
pub fn payload(report: &RawReport) -> Result<&[u8], StreamFault> {
    let data_length = report.data_length();
    let len = (data_length as usize).saturating_sub(1);
    let end = OFFSET_PAYLOAD + len;
    if end > REPORT_LEN {
        return Err(StreamFault::Oversized { data_length });
    }
    Ok(&report.as_bytes()[OFFSET_PAYLOAD..end])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The payload was applied to the grid.
    Applied { new_frame: bool },
    /// Not a touch scan; nothing changed.
    Dropped { footer: u8 },
}

/// Decoder state carried from one report to the next.
#[derive(Debug, Clone, Default)]
pub struct DecodeSession {
    cursor: Cursor,
    grid: Grid,
    last_timestamp: Option<u8>,
}

impl DecodeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn reset(&mut self, timestamp: u8) {
        self.grid.clear();
        self.cursor = Cursor::new();
        self.last_timestamp = Some(timestamp);
    }

    /// Apply one touch-scan report.
    ///
    /// Reports whose footer is not the touch-scan footer are dropped without
    /// touching the session. A new timestamp starts a new frame; a repeated
    /// one continues the current frame where the last report stopped.
    pub fn decode(&mut self, report: &RawReport) -> Result<DecodeOutcome, StreamFault> {
        if report.footer() != TOUCH_FOOTER {
            return Ok(DecodeOutcome::Dropped {
                footer: report.footer(),
            });
        }
        let payload = payload(report)?;

        let timestamp = report.timestamp();
        let new_frame = self.last_timestamp != Some(timestamp);
        if new_frame {
            self.reset(timestamp);
        }

        let mut cursor = self.cursor;
        for nibble in nibbles(payload) {
            let (next, write) = step(cursor, nibble);
            if let Some((x, y, value)) = write {
                self.grid.set(x, y, value);
            }
            cursor = next;
        }
        self.cursor = cursor;

        Ok(DecodeOutcome::Applied { new_frame })
    }
}
