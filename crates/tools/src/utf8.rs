//! Incremental UTF-8 decoding for byte increments.
//!
//! A multi-byte character may be split across two increments; the decoder keeps
//! the incomplete suffix of one increment and completes it with the head of the
//! next. Invalid sequences decode to U+FFFD so decoding always makes progress.

/// Longest incomplete-but-valid UTF-8 prefix (a 4-byte sequence missing its last byte).
const MAX_CARRY: usize = 3;

/// Streaming UTF-8 decoder with a small carry buffer.
#[derive(Clone, Debug, Default)]
pub struct Utf8Decoder {
    carry: [u8; MAX_CARRY + 1],
    carry_len: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.carry_len
    }

    /// Decode `bytes` and append the text to `out`.
    pub fn push(&mut self, mut bytes: &[u8], out: &mut String) {
        while self.carry_len > 0 {
            let Some((&next, rest)) = bytes.split_first() else {
                return;
            };
            bytes = rest;
            self.carry[self.carry_len] = next;
            self.carry_len += 1;
            match std::str::from_utf8(&self.carry[..self.carry_len]) {
                Ok(text) => {
                    out.push_str(text);
                    self.carry_len = 0;
                }
                Err(err) => {
                    let Some(bad_len) = err.error_len() else {
                        // Still a valid prefix, wait for more bytes.
                        continue;
                    };
                    out.push('\u{FFFD}');
                    let held = self.carry;
                    let held_len = self.carry_len;
                    self.carry_len = 0;
                    self.decode(&held[bad_len..held_len], out);
                }
            }
        }
        self.decode(bytes, out);
    }

    /// Flush a dangling incomplete sequence as U+FFFD.
    pub fn finish(&mut self, out: &mut String) {
        if self.carry_len == 0 {
            return;
        }
        out.push_str(&String::from_utf8_lossy(&self.carry[..self.carry_len]));
        self.carry_len = 0;
    }

    fn decode(&mut self, mut bytes: &[u8], out: &mut String) {
        debug_assert_eq!(self.carry_len, 0);
        while !bytes.is_empty() {
            let err = match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => err,
            };
            let (valid, tail) = bytes.split_at(err.valid_up_to());
            out.push_str(&String::from_utf8_lossy(valid));
            match err.error_len() {
                Some(bad_len) => {
                    out.push('\u{FFFD}');
                    bytes = &tail[bad_len..];
                }
                None => {
                    debug_assert!(tail.len() <= MAX_CARRY);
                    self.carry[..tail.len()].copy_from_slice(tail);
                    self.carry_len = tail.len();
                    return;
                }
            }
        }
    }
}

/// Decode a whole byte sequence split at `boundaries`, as a byte stream would deliver it.
pub fn decode_split(bytes: &[u8], boundaries: &[usize]) -> String {
    let mut decoder = Utf8Decoder::new();
    let mut out = String::with_capacity(bytes.len());
    let mut last = 0usize;
    for &idx in boundaries {
        assert!(idx >= last && idx <= bytes.len(), "invalid boundary {idx}");
        decoder.push(&bytes[last..idx], &mut out);
        last = idx;
    }
    decoder.push(&bytes[last..], &mut out);
    decoder.finish(&mut out);
    out
}
