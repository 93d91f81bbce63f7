//! Decoder for the Microsoft Touch Mouse (045E:0773) raw touch stream.
//!
//! In touch mode the mouse interleaves two report types on its hidraw node:
//! 32-byte touch scans carrying a nibble-packed, run-length compressed
//! image of the capacitive sensor, and 3-byte contact reports. The
//! sensor's active area is diamond shaped, so the image is walked over an
//! irregular 15x13 grid.

pub mod backend;
pub mod contact;
pub mod decoder;
pub mod grid;
pub mod protocol;
pub mod touchmode;
pub mod walker;

pub const VENDOR_ID: u16 = 0x045E;
pub const PRODUCT_ID: u16 = 0x0773;

pub const GRID_WIDTH: usize = 15;
pub const GRID_HEIGHT: usize = 13;
