use crate::nmea::{GpsData, NmeaError, NmeaParser, ParsedSentence};

/// NMEA receiver state for one GPS serial port.
pub struct Gps {
    pub parser: NmeaParser,

    pub last_result: Option<Result<ParsedSentence, NmeaError>>,
    pub last_fix: Option<GpsData>,
    pub count: usize,
}

impl Default for Gps {
    fn default() -> Self {
        Self::new()
    }
}

impl Gps {
    pub fn new() -> Self {
        Self {
            parser: NmeaParser::new(),
            last_result: None,
            last_fix: None,
            count: 0,
        }
    }

    /// Handles one received byte, returning the fix if it completed a
    /// `$GPRMC` sentence.
    pub fn handle(&mut self, b: u8) -> Option<GpsData> {
        self.count = self.count.wrapping_add(1);
        trace!("got {:x} #{}", b, self.count);

        let r = self.parser.process_byte(b)?;
        let fix = match r {
            Ok(ParsedSentence::Rmc(fix)) => {
                self.last_fix = Some(fix);
                Some(fix)
            }
            _ => None,
        };
        self.last_result = Some(r);
        fix
    }

    /// Drains `read` until it would block, returning the newest fix seen.
    ///
    /// `read` is any non-blocking byte source, typically a HAL serial
    /// receiver's `read`.
    pub fn poll<E>(
        &mut self,
        mut read: impl FnMut() -> nb::Result<u8, E>,
    ) -> Result<Option<GpsData>, E> {
        let mut fix = None;
        loop {
            match read() {
                Ok(b) => {
                    if let Some(f) = self.handle(b) {
                        fix = Some(f);
                    }
                }
                Err(nb::Error::WouldBlock) => return Ok(fix),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }

    /// Whether the last decoded fix was marked valid by the receiver.
    pub fn has_fix(&self) -> bool {
        self.last_fix.map_or(false, |fix| fix.valid)
    }
}
