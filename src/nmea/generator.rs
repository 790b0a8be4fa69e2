use super::{hex_digits, NmeaChecksum};

// States are named for the portion of the sentence which is *about to be sent*
#[derive(Copy, Clone)]
enum GeneratorState<'a> {
    Start { payload: &'a [u8] },
    Payload { rest: &'a [u8], checksum: NmeaChecksum },
    Checksum1 { checksum: NmeaChecksum },
    Checksum2 { checksum: NmeaChecksum },
    Cr,
    Lf,
    Done,
}
use GeneratorState::*;

/// Bytes of a complete `$<payload>*HH\r\n` sentence, e.g. a receiver
/// configuration command.
pub struct NmeaGenerator<'a>(GeneratorState<'a>);

impl<'a> NmeaGenerator<'a> {
    /// `payload` is everything between `$` and `*`, such as `PMTK220,1000`.
    pub fn new(payload: &'a [u8]) -> Self {
        Self(Start { payload })
    }

    pub fn done(&self) -> bool {
        matches!(self.0, Done)
    }

    /// Length on the wire for a payload of `payload_len` bytes.
    pub fn sentence_len(payload_len: usize) -> usize {
        payload_len + 6
    }
}

impl Iterator for NmeaGenerator<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0 {
            Start { payload } => {
                self.0 = Payload {
                    rest: payload,
                    checksum: NmeaChecksum::new(),
                };
                Some(b'$')
            }
            Payload { rest, checksum } => match rest.split_first() {
                Some((&val, rest)) => {
                    self.0 = Payload {
                        rest,
                        checksum: checksum.next(val),
                    };
                    Some(val)
                }
                None => {
                    self.0 = Checksum1 { checksum };
                    Some(b'*')
                }
            },
            Checksum1 { checksum } => {
                self.0 = Checksum2 { checksum };
                Some(hex_digits(checksum.0)[0])
            }
            Checksum2 { checksum } => {
                self.0 = Cr;
                Some(hex_digits(checksum.0)[1])
            }
            Cr => {
                self.0 = Lf;
                Some(b'\r')
            }
            Lf => {
                self.0 = Done;
                Some(b'\n')
            }
            Done => None,
        }
    }
}
