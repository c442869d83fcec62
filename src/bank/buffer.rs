use super::StringBank;
use crate::compat::Vec;
use core::{mem, str};

const INLINE_LEN: usize = 1;
const SPILLED_LEN: usize = mem::size_of::<usize>();
const MAX_INLINE_LEN: usize = 254;
const SPILL_MARKER: u8 = 255;

/// The default string bank: a single append-only byte buffer.
///
/// Each saved string is written as a length tag followed by its payload, and
/// its offset is the position of the tag:
///
/// - length <= 254: 1-byte length, then payload
/// - length >= 255: `0xFF`, little-endian `usize` length, then payload
///
/// Strings of ordinary length pay a single byte of overhead, nothing is ever
/// moved or reclaimed, and a `get` is one length decode plus a slice. The
/// buffer reallocates as it grows, which is fine because only offsets escape.
#[derive(Debug, Default, Clone)]
pub struct BufferBank {
    buffer: Vec<u8>,
}

impl StringBank for BufferBank {
    #[cfg_attr(feature = "inline-more", inline)]
    fn with_capacity(capacity: usize) -> Self {
        /// According to google the approx. word length is 5.
        const DEFAULT_STR_LEN: usize = 5;
        Self {
            buffer: Vec::with_capacity(capacity * (DEFAULT_STR_LEN + INLINE_LEN)),
        }
    }

    fn save(&mut self, string: &str) -> usize {
        let offset = self.buffer.len();
        let len = string.len();
        if len <= MAX_INLINE_LEN {
            self.buffer.reserve(INLINE_LEN + len);
            self.buffer.push(len as u8);
        } else {
            self.buffer.reserve(INLINE_LEN + SPILLED_LEN + len);
            self.buffer.push(SPILL_MARKER);
            self.buffer.extend_from_slice(&len.to_le_bytes());
        }
        self.buffer.extend_from_slice(string.as_bytes());
        offset
    }

    #[inline]
    fn get(&self, offset: usize) -> &str {
        let tag = self.buffer[offset];
        let (len, payload) = if tag == SPILL_MARKER {
            let start = offset + INLINE_LEN;
            let len_bytes =
                <[u8; SPILLED_LEN]>::try_from(&self.buffer[start..start + SPILLED_LEN]).unwrap();
            (usize::from_le_bytes(len_bytes), start + SPILLED_LEN)
        } else {
            (tag as usize, offset + INLINE_LEN)
        };
        let bytes = &self.buffer[payload..payload + len];
        // SAFETY: the buffer only ever receives whole `&str` payloads and
        //         offsets address their length tag, so `bytes` spans exactly
        //         one valid utf8 payload.
        unsafe { str::from_utf8_unchecked(bytes) }
    }

    #[inline]
    fn size(&self) -> usize {
        self.buffer.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferBank, StringBank, MAX_INLINE_LEN};
    use crate::compat::{String, ToString};

    #[test]
    fn saved_strings_resolve() {
        let mut bank = BufferBank::default();
        let hello = bank.save("hello");
        let world = bank.save("world");
        assert_eq!(bank.get(hello), "hello");
        assert_eq!(bank.get(world), "world");
        assert_eq!(bank.get(hello), "hello");
    }

    #[test]
    fn empty_string_is_storable() {
        let mut bank = BufferBank::default();
        let offset = bank.save("");
        assert_eq!(bank.get(offset), "");
    }

    #[test]
    fn long_strings_spill_the_length() {
        let mut bank = BufferBank::default();
        let boundary: String = "x".repeat(MAX_INLINE_LEN);
        let spilled: String = "y".repeat(MAX_INLINE_LEN + 1);
        let long: String = "z".repeat(70_000);

        let a = bank.save(&boundary);
        let b = bank.save(&spilled);
        let c = bank.save(&long);
        let d = bank.save("tail");

        assert_eq!(bank.get(a), boundary);
        assert_eq!(bank.get(b), spilled);
        assert_eq!(bank.get(c), long);
        assert_eq!(bank.get(d), "tail");
    }

    #[test]
    fn size_never_shrinks() {
        let mut bank = BufferBank::default();
        let mut last = bank.size();
        for i in 0..1000 {
            bank.save(&i.to_string());
            assert!(bank.size() >= last);
            last = bank.size();
        }
        assert!(last > 0);
    }
}
