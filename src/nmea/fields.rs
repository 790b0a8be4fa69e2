//! Comma-separated field access for captured sentences.
//!
//! Fields borrow from the sentence, so any number may be held at once.
//! Field 0 is the header including `$` (e.g. `$GPRMC`); the last field ends
//! at the `*` checksum marker.

/// Iterator over the fields of one sentence.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    rest: Option<&'a [u8]>,
}

impl<'a> Iterator for Fields<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        match rest.iter().position(|&b| b == b',') {
            Some(comma) => {
                self.rest = Some(&rest[comma + 1..]);
                Some(&rest[..comma])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

pub fn fields(sentence: &[u8]) -> Fields<'_> {
    let end = sentence
        .iter()
        .position(|&b| b == b'*')
        .unwrap_or(sentence.len());
    Fields {
        rest: Some(&sentence[..end]),
    }
}

/// Text of field `index`, or `None` when the sentence has fewer fields.
pub fn field(sentence: &[u8], index: usize) -> Option<&[u8]> {
    fields(sentence).nth(index)
}

pub fn field_count(sentence: &[u8]) -> usize {
    fields(sentence).count()
}
