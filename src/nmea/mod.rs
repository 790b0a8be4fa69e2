use tinyvec::ArrayVec;

pub mod fields;
pub mod generator;
pub mod parser;
pub mod rmc;

pub use fields::{field, field_count, fields, Fields};
pub use generator::NmeaGenerator;
pub use parser::NmeaParser;
pub use rmc::{
    decode_rmc, parse_coordinate, parse_gpgga, parse_gprmc, parse_sentence, DecodeMode, GpsData,
    ParsedSentence,
};

/// Longest sentence NMEA 0183 allows, `$` through the two checksum digits.
pub const NMEA_MAX_LEN: usize = 82;

#[derive(Default, Debug, Copy, Clone)]
pub struct NmeaBuf(pub ArrayVec<[u8; NMEA_MAX_LEN]>);

impl NmeaBuf {
    pub fn new() -> Self {
        Self(ArrayVec::new())
    }

    /// Whether `n` more bytes fit.
    pub fn has_room(&self, n: usize) -> bool {
        self.0.len() + n <= NMEA_MAX_LEN
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NmeaBuf {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=[u8]:a}", self.0.as_slice())
    }
}

impl core::ops::Deref for NmeaBuf {
    type Target = ArrayVec<[u8; NMEA_MAX_LEN]>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::ops::DerefMut for NmeaBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Running XOR over the bytes between `$` and `*`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NmeaChecksum(pub u8);

impl NmeaChecksum {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(self, byte: u8) -> Self {
        Self(self.0 ^ byte)
    }
}

impl PartialEq<u8> for NmeaChecksum {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

/// Checksum of a whole payload (the text between `$` and `*`).
pub fn checksum(payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(NmeaChecksum::new(), |c, &b| c.next(b))
        .0
}

/// Value of one ASCII hex digit, either case.
pub fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

/// Uppercase hex digits of `byte`, high nibble first.
pub fn hex_digits(byte: u8) -> [u8; 2] {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    [DIGITS[(byte >> 4) as usize], DIGITS[(byte & 0x0f) as usize]]
}

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NmeaError {
    #[error("checksum mismatch: computed {expect:#04x}, sentence says {saw:#04x}")]
    BadChecksum { expect: u8, saw: u8 },
    #[error("checksum digit {0:#04x} is not hex")]
    BadChecksumDigit(u8),
    #[error("sentence longer than 82 bytes")]
    TooLong,
    #[error("line ended before the checksum marker")]
    Unterminated,
    #[error("not the expected sentence type")]
    WrongSentence,
    #[error("field {index} is malformed")]
    BadField { index: usize },
    #[error("sentence type not supported")]
    Unsupported,
}
