use super::{hex_value, rmc, NmeaBuf, NmeaChecksum, NmeaError, ParsedSentence};

/// `*` plus two checksum digits, kept free while the payload is read.
const CHECKSUM_SUFFIX_LEN: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ParserState {
    /// Waiting for `$`.
    Idle,
    /// Between `$` and `*`.
    Reading { checksum: NmeaChecksum },
    /// After `*`, collecting the two checksum digits.
    Complete {
        expect: NmeaChecksum,
        high: Option<u8>,
    },
    /// Last sentence was dropped; waiting for `$`.
    Error,
}
use ParserState::*;

/// Byte-at-a-time scanner for `$...*HH` sentences.
///
/// Constant work per byte and no allocation, so it can be fed straight from
/// a UART receive interrupt.
pub struct NmeaParser {
    state: ParserState,
    buf: NmeaBuf,
}

impl Default for NmeaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NmeaParser {
    pub fn new() -> Self {
        Self {
            state: Idle,
            buf: NmeaBuf::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state = Idle;
        self.buf.clear();
    }

    fn restart(&mut self) {
        self.buf.clear();
        let _ = self.buf.try_push(b'$');
        self.state = Reading {
            checksum: NmeaChecksum::new(),
        };
    }

    fn fail(&mut self, err: NmeaError) -> Option<Result<(), NmeaError>> {
        debug!("dropped sentence: {}", err);
        self.state = Error;
        Some(Err(err))
    }

    fn step(&mut self, b: u8) -> Option<Result<(), NmeaError>> {
        if b == b'$' {
            if !matches!(self.state, Idle | Error) {
                debug!("restart inside sentence, {} bytes dropped", self.buf.len());
            }
            self.restart();
            return None;
        }

        match self.state {
            Idle | Error => None,
            Reading { checksum } => match b {
                b'*' => {
                    let _ = self.buf.try_push(b);
                    self.state = Complete {
                        expect: checksum,
                        high: None,
                    };
                    None
                }
                b'\r' | b'\n' => self.fail(NmeaError::Unterminated),
                _ if self.buf.has_room(1 + CHECKSUM_SUFFIX_LEN) => {
                    let _ = self.buf.try_push(b);
                    self.state = Reading {
                        checksum: checksum.next(b),
                    };
                    None
                }
                _ => self.fail(NmeaError::TooLong),
            },
            Complete { expect, high } => {
                let Some(nibble) = hex_value(b) else {
                    return self.fail(NmeaError::BadChecksumDigit(b));
                };
                let _ = self.buf.try_push(b);
                match high {
                    None => {
                        self.state = Complete {
                            expect,
                            high: Some(nibble),
                        };
                        None
                    }
                    Some(high) => {
                        let saw = high << 4 | nibble;
                        if expect == saw {
                            trace!("sentence complete, {} bytes", self.buf.len());
                            self.state = Idle;
                            Some(Ok(()))
                        } else {
                            self.fail(NmeaError::BadChecksum {
                                expect: expect.0,
                                saw,
                            })
                        }
                    }
                }
            }
        }
    }

    /// Feeds one byte. Returns `true` exactly on the byte completing a
    /// checksum-valid sentence, which is then available from
    /// [`sentence`](Self::sentence) until the next `$` arrives.
    pub fn feed(&mut self, b: u8) -> bool {
        matches!(self.step(b), Some(Ok(())))
    }

    /// Like [`feed`](Self::feed), but reports why a sentence was dropped and
    /// decodes completed sentences.
    pub fn process_byte(&mut self, b: u8) -> Option<Result<ParsedSentence, NmeaError>> {
        self.step(b)
            .map(|r| r.and_then(|()| rmc::parse_sentence(&self.buf)))
    }

    /// The captured sentence, `$` through the checksum digits.
    pub fn sentence(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.sentence()).ok()
    }

    /// Whether a sentence is partially captured.
    pub fn in_sentence(&self) -> bool {
        matches!(self.state, Reading { .. } | Complete { .. })
    }
}
