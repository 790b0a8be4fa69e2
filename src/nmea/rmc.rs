use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::{field, NmeaError};
use crate::Position;

/// One `$GPRMC` fix.
///
/// Coordinates are microdegrees, negative south and west. Speed is in
/// tenths of a knot, course in tenths of a degree, year counts from 2000.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsData {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub latitude: i32,
    pub longitude: i32,
    pub speed: u16,
    pub course: u16,
    pub day: u8,
    pub month: u8,
    pub year: u8,
    pub valid: bool,
}

impl GpsData {
    pub fn lat_degrees(&self) -> f32 {
        self.latitude as f32 / 1_000_000.0
    }

    pub fn lon_degrees(&self) -> f32 {
        self.longitude as f32 / 1_000_000.0
    }

    pub fn position(&self) -> Position {
        Position {
            lat: self.lat_degrees(),
            lon: self.lon_degrees(),
        }
    }

    /// UTC time of the fix, `None` if the date or time fields are out of range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(
            2000 + self.year as i32,
            self.month as u32,
            self.day as u32,
        )?;
        let time = NaiveTime::from_hms_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
        )?;
        Some(DateTime::from_naive_utc_and_offset(
            NaiveDateTime::new(date, time),
            Utc,
        ))
    }
}

/// How [`decode_rmc`] treats a field that is present but unreadable.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeMode {
    /// Leave the value zero and carry on.
    #[default]
    Lenient,
    /// Fail with [`NmeaError::BadField`].
    Strict,
}

impl DecodeMode {
    fn decode<T: Default>(
        self,
        sentence: &[u8],
        index: usize,
        parse: impl FnOnce(&[u8]) -> Option<T>,
    ) -> Result<T, NmeaError> {
        let Some(text) = field(sentence, index).filter(|t| !t.is_empty()) else {
            return Ok(T::default());
        };
        match (parse(text), self) {
            (Some(value), _) => Ok(value),
            (None, DecodeMode::Strict) => Err(NmeaError::BadField { index }),
            (None, DecodeMode::Lenient) => {
                debug!("field {} unreadable, left zero", index);
                Ok(T::default())
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParsedSentence {
    Rmc(GpsData),
    /// Valid sentence of a type this crate does not decode.
    Other,
}

/// Decodes whatever sentence type `sentence` holds.
pub fn parse_sentence(sentence: &[u8]) -> Result<ParsedSentence, NmeaError> {
    match field(sentence, 0) {
        Some(b"$GPRMC") => parse_gprmc(sentence).map(ParsedSentence::Rmc),
        _ => Ok(ParsedSentence::Other),
    }
}

/// Lenient `$GPRMC` decode: missing or unreadable fields stay zero.
pub fn parse_gprmc(sentence: &[u8]) -> Result<GpsData, NmeaError> {
    decode_rmc(sentence, DecodeMode::Lenient)
}

pub fn decode_rmc(sentence: &[u8], mode: DecodeMode) -> Result<GpsData, NmeaError> {
    if field(sentence, 0) != Some(&b"$GPRMC"[..]) {
        return Err(NmeaError::WrongSentence);
    }

    let (hour, minute, second) = mode.decode(sentence, 1, six_digits)?;
    let valid = field(sentence, 2).and_then(|f| f.first()) == Some(&b'A');

    let lat_hemisphere = hemisphere(sentence, 4, b'N', b"NS", mode)?;
    let latitude = mode.decode(sentence, 3, |t| parse_coordinate(t, lat_hemisphere))?;
    let lon_hemisphere = hemisphere(sentence, 6, b'E', b"EW", mode)?;
    let longitude = mode.decode(sentence, 5, |t| parse_coordinate(t, lon_hemisphere))?;

    let speed = mode.decode(sentence, 7, tenths)?;
    let course = mode.decode(sentence, 8, tenths)?;
    let (day, month, year) = mode.decode(sentence, 9, six_digits)?;

    Ok(GpsData {
        hour,
        minute,
        second,
        latitude,
        longitude,
        speed,
        course,
        day,
        month,
        year,
        valid,
    })
}

/// `$GPGGA` decoding is not implemented yet; always `Unsupported`.
pub fn parse_gpgga(_sentence: &[u8]) -> Result<GpsData, NmeaError> {
    Err(NmeaError::Unsupported)
}

fn hemisphere(
    sentence: &[u8],
    index: usize,
    default: u8,
    allowed: &[u8],
    mode: DecodeMode,
) -> Result<u8, NmeaError> {
    match field(sentence, index).and_then(|f| f.first()) {
        None => Ok(default),
        Some(h) if mode == DecodeMode::Strict && !allowed.contains(h) => {
            Err(NmeaError::BadField { index })
        }
        Some(&h) => Ok(h),
    }
}

/// `DDMM.MMMM` (hemisphere `N`/`S`) or `DDDMM.MMMM` (any other hemisphere)
/// to signed microdegrees. Fractional minutes beyond four digits are ignored.
pub fn parse_coordinate(text: &[u8], hemisphere: u8) -> Option<i32> {
    let deg_digits = match hemisphere {
        b'N' | b'S' => 2,
        _ => 3,
    };
    let dot = text.iter().position(|&b| b == b'.')?;
    if dot != deg_digits + 2 {
        return None;
    }
    let degrees = digits(&text[..deg_digits])? as i64;
    let minutes = digits(&text[deg_digits..dot])? as i64;

    let frac = &text[dot + 1..];
    if !frac.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let frac_e4 = frac
        .iter()
        .chain([b'0'; 4].iter())
        .take(4)
        .fold(0, |acc, &b| acc * 10 + (b - b'0') as i64);

    let minutes_e4 = minutes * 10_000 + frac_e4;
    let micro = degrees * 1_000_000 + minutes_e4 * 1_000_000 / 60 / 10_000;
    let micro = i32::try_from(micro).ok()?;
    match hemisphere {
        b'S' | b'W' => Some(-micro),
        _ => Some(micro),
    }
}

/// Decimal with at most one honored fractional digit, scaled by 10.
fn tenths(text: &[u8]) -> Option<u16> {
    let (whole, frac) = match text.iter().position(|&b| b == b'.') {
        Some(dot) => (&text[..dot], &text[dot + 1..]),
        None => (text, &[][..]),
    };
    if (whole.is_empty() && frac.is_empty()) || !frac.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let whole = if whole.is_empty() { 0 } else { digits(whole)? };
    let tenth = frac.first().map_or(0, |&b| b - b'0');
    u16::try_from(whole)
        .ok()?
        .checked_mul(10)?
        .checked_add(tenth as u16)
}

/// Three two-digit numbers from the first six characters (hhmmss, ddmmyy).
fn six_digits(text: &[u8]) -> Option<(u8, u8, u8)> {
    let text = text.get(..6)?;
    Some((
        digits(&text[0..2])? as u8,
        digits(&text[2..4])? as u8,
        digits(&text[4..6])? as u8,
    ))
}

fn digits(text: &[u8]) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    text.iter().try_fold(0u32, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add((b - b'0') as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};

    const RMC: &[u8] =
        b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    #[test]
    fn decodes_reference_sentence() {
        let fix = parse_gprmc(RMC).unwrap();
        assert_eq!(
            fix,
            GpsData {
                hour: 12,
                minute: 35,
                second: 19,
                latitude: 48_117_300,
                longitude: 11_516_666,
                speed: 224,
                course: 844,
                day: 23,
                month: 3,
                year: 94,
                valid: true,
            }
        );
    }

    #[test]
    fn southern_and_western_hemispheres() {
        let fix = parse_gprmc(
            b"$GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191194,020.3,E*68",
        )
        .unwrap();
        assert_eq!(fix.latitude, 49_274_166);
        assert_eq!(fix.longitude, -123_185_333);
        assert_eq!((fix.speed, fix.course), (5, 547));

        let fix = parse_gprmc(
            b"$GPRMC,081836,A,3751.65,S,14507.36,E,000.0,360.0,130998,011.3,E*62",
        )
        .unwrap();
        assert_eq!(fix.latitude, -37_860_833);
        assert_eq!(fix.longitude, 145_122_666);
        assert_eq!((fix.day, fix.month, fix.year), (13, 9, 98));
    }

    #[test]
    fn empty_fields_give_zeroed_invalid_fix() {
        let fix = parse_gprmc(b"$GPRMC,,V,,,,,,,,,,N*53").unwrap();
        assert_eq!(fix, GpsData::default());
        assert!(!fix.valid);

        let fix = decode_rmc(b"$GPRMC,,V,,,,,,,,,,N*53", DecodeMode::Strict).unwrap();
        assert_eq!(fix, GpsData::default());
    }

    #[test]
    fn truncated_sentence_is_partial_fix() {
        let fix = parse_gprmc(b"$GPRMC,123519,A,4807.038,N").unwrap();
        assert_eq!((fix.hour, fix.minute, fix.second), (12, 35, 19));
        assert_eq!(fix.latitude, 48_117_300);
        assert_eq!(fix.longitude, 0);
        assert_eq!(fix.day, 0);
    }

    #[test]
    fn wrong_header() {
        assert_matches!(parse_gprmc(b"$GPGGA,123519*00"), Err(NmeaError::WrongSentence));
        assert_matches!(parse_gprmc(b"$GPRMCX,123519"), Err(NmeaError::WrongSentence));
        assert_matches!(parse_gprmc(b""), Err(NmeaError::WrongSentence));
    }

    #[test]
    fn lenient_zeroes_malformed_fields() {
        let fix = parse_gprmc(b"$GPRMC,12:35,A,48x7.038,N,01131.000,E,fast,084.4,2303").unwrap();
        assert_eq!((fix.hour, fix.minute, fix.second), (0, 0, 0));
        assert_eq!(fix.latitude, 0);
        assert_eq!(fix.longitude, 11_516_666);
        assert_eq!(fix.speed, 0);
        assert_eq!(fix.course, 844);
        assert_eq!((fix.day, fix.month, fix.year), (0, 0, 0));
    }

    #[test]
    fn strict_names_the_bad_field() {
        fn strict(s: &[u8]) -> Result<GpsData, NmeaError> {
            decode_rmc(s, DecodeMode::Strict)
        }

        assert_matches!(strict(b"$GPRMC,1235,A"), Err(NmeaError::BadField { index: 1 }));
        assert_matches!(
            strict(b"$GPRMC,123519,A,4807038,N"),
            Err(NmeaError::BadField { index: 3 })
        );
        assert_matches!(
            strict(b"$GPRMC,123519,A,4807.038,Q"),
            Err(NmeaError::BadField { index: 4 })
        );
        assert_matches!(
            strict(b"$GPRMC,123519,A,4807.038,N,01131.000,E,22.4,8x"),
            Err(NmeaError::BadField { index: 8 })
        );
        assert!(strict(RMC).is_ok());
    }

    #[test]
    fn coordinates() {
        assert_eq!(parse_coordinate(b"4807.038", b'N'), Some(48_117_300));
        assert_eq!(parse_coordinate(b"01131.000", b'E'), Some(11_516_666));
        assert_eq!(parse_coordinate(b"01131.000", b'W'), Some(-11_516_666));
        assert_eq!(parse_coordinate(b"4807.038", b'S'), Some(-48_117_300));
        // Fraction digits past the fourth don't count
        assert_eq!(
            parse_coordinate(b"4807.03812", b'N'),
            parse_coordinate(b"4807.0381", b'N')
        );
        assert_eq!(parse_coordinate(b"4807.", b'N'), Some(48_116_666));
        assert_eq!(parse_coordinate(b"0000.0000", b'N'), Some(0));
    }

    #[test]
    fn malformed_coordinates() {
        assert_eq!(parse_coordinate(b"", b'N'), None);
        assert_eq!(parse_coordinate(b"4807038", b'N'), None);
        assert_eq!(parse_coordinate(b"4807", b'N'), None);
        assert_eq!(parse_coordinate(b"4807.038", b'E'), None);
        assert_eq!(parse_coordinate(b"48a7.038", b'N'), None);
        assert_eq!(parse_coordinate(b"4807.0x8", b'N'), None);
    }

    #[test]
    fn tenths_fixed_point() {
        assert_eq!(tenths(b"022.4"), Some(224));
        assert_eq!(tenths(b"12.3"), Some(123));
        assert_eq!(tenths(b"12.39"), Some(123));
        assert_eq!(tenths(b"22"), Some(220));
        assert_eq!(tenths(b".5"), Some(5));
        assert_eq!(tenths(b"7."), Some(70));
        assert_eq!(tenths(b"."), None);
        assert_eq!(tenths(b"6553.5"), Some(65535));
        assert_eq!(tenths(b"6553.6"), None);
        assert_eq!(tenths(b"1e3"), None);
    }

    #[test]
    fn gpgga_is_not_supported() {
        assert_matches!(
            parse_gpgga(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47"),
            Err(NmeaError::Unsupported)
        );
    }

    #[test]
    fn dispatch_by_header() {
        assert_matches!(parse_sentence(RMC), Ok(ParsedSentence::Rmc(_)));
        assert_matches!(
            parse_sentence(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47"),
            Ok(ParsedSentence::Other)
        );
    }

    #[test]
    fn datetime_and_position() {
        let fix = parse_gprmc(RMC).unwrap();
        let when = fix.datetime().unwrap();
        assert_eq!((when.year(), when.month(), when.day()), (2094, 3, 23));
        assert_eq!((when.hour(), when.minute(), when.second()), (12, 35, 19));

        let pos = fix.position();
        assert!(pos.lat > 48.1172 && pos.lat < 48.1174);
        assert!(pos.lon > 11.5166 && pos.lon < 11.5168);

        assert_eq!(GpsData::default().datetime(), None);
    }
}
