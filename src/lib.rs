#![no_std]

//! NMEA 0183 sentence scanning and `$GPRMC` decoding for GPS receivers
//! attached to a UART.
//!
//! Bytes go into [`nmea::NmeaParser`] one at a time (from a polling loop or
//! a receive interrupt); completed, checksum-verified sentences are decoded
//! into [`nmea::GpsData`]. Nothing here allocates.

use core::fmt::{self, Write};

use tinyvec::ArrayVec; // memory layout

// Logging goes through defmt when the `defmt` feature is on, and compiles
// away otherwise so the crate links on hosts without a global logger.
#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

pub mod gps;
pub mod nmea;

pub use gps::Gps;
pub use nmea::{GpsData, NmeaError, NmeaParser};

/// Fixed-capacity `core::fmt::Write` sink, for formatting sentence payloads
/// without a heap.
pub struct FmtBuf<const N: usize = 256>(pub ArrayVec<[u8; N]>);

impl<const N: usize> Write for FmtBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            if self.0.try_push(b).is_some() {
                return Err(fmt::Error);
            }
        }
        Ok(())
    }
}

impl<const N: usize> FmtBuf<N> {
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.0.as_slice()).ok()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn new() -> Self {
        Self(Default::default())
    }
}

impl<const N: usize> Default for FmtBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Position in floating point degrees, negative south and west.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub lat: f32,
    pub lon: f32,
}
