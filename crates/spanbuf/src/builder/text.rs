//! UTF-16 text on top of [`GrowableBuffer`].
//!
//! The content is a sequence of raw UTF-16 code units. Nothing here validates
//! surrogate pairing: an edit can split a pair and the builder will keep the
//! halves as they are. Decoding for [`Display`](core::fmt::Display) replaces
//! unpaired surrogates with U+FFFD.

use alloc::vec::Vec;
use core::fmt;

use bstr::ByteSlice;

use super::GrowableBuffer;
use crate::{
    Result,
    pool::{BufferPool, HeapPool},
};

/// A [`GrowableBuffer`] of UTF-16 code units.
///
/// # Examples
///
/// ```rust
/// use spanbuf::ValueStringBuilder;
///
/// let mut scratch = [0u16; 32];
/// let mut sb = ValueStringBuilder::from_view(&mut scratch);
/// sb.append_str("stack ")?;
/// sb.append_char('🦀')?;
/// assert_eq!(sb.len(), 8);
/// assert_eq!(sb.to_string(), "stack 🦀");
/// # Ok::<(), spanbuf::BuilderError>(())
/// ```
pub type ValueStringBuilder<'a, P = HeapPool> = GrowableBuffer<'a, u16, P>;

const SPACE: u16 = b' ' as u16;

impl<P: BufferPool<u16>> GrowableBuffer<'_, u16, P> {
    /// Appends the UTF-16 encoding of `s`.
    pub fn append_str(&mut self, s: &str) -> Result<()> {
        // A UTF-8 string never has fewer bytes than UTF-16 code units, so the
        // byte length is a cheap upper bound when it already fits.
        if s.len() > self.spare() {
            self.reserve_additional(s.encode_utf16().count())?;
        }
        let mut written = 0;
        for (slot, unit) in self.remaining_mut().iter_mut().zip(s.encode_utf16()) {
            *slot = unit;
            written += 1;
        }
        self.len += written;
        Ok(())
    }

    /// Appends one or two code units for `c`.
    pub fn append_char(&mut self, c: char) -> Result<()> {
        let mut units = [0u16; 2];
        let encoded = c.encode_utf16(&mut units);
        if let [unit] = encoded {
            self.push(*unit)
        } else {
            self.extend_from_slice(encoded)
        }
    }

    /// Appends a line feed.
    pub fn append_line(&mut self) -> Result<()> {
        self.push(u16::from(b'\n'))
    }

    /// Appends `s` followed by a line feed.
    pub fn append_line_str(&mut self, s: &str) -> Result<()> {
        self.append_str(s)?;
        self.append_line()
    }

    /// Appends bytes that are expected to be UTF-8, substituting U+FFFD for
    /// each invalid sequence.
    pub fn append_utf8_lossy(&mut self, bytes: &[u8]) -> Result<()> {
        for chunk in ByteSlice::utf8_chunks(bytes) {
            self.append_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                self.push(char::REPLACEMENT_CHARACTER as u16)?;
            }
        }
        Ok(())
    }

    /// Inserts the UTF-16 encoding of `s` at code-unit offset `index`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`](crate::BuilderError::ArgumentOutOfRange)
    /// if `index > len()`.
    pub fn insert_str(&mut self, index: usize, s: &str) -> Result<()> {
        let count = s.encode_utf16().count();
        let gap = self.open_gap(index, count)?;
        for (slot, unit) in gap.iter_mut().zip(s.encode_utf16()) {
            *slot = unit;
        }
        Ok(())
    }

    /// Replaces every occurrence of `old` with `new` across the content.
    ///
    /// # Errors
    ///
    /// See [`replace`](GrowableBuffer::replace).
    pub fn replace_str(&mut self, old: &str, new: &str) -> Result<()> {
        let old: Vec<u16> = old.encode_utf16().collect();
        let new: Vec<u16> = new.encode_utf16().collect();
        self.replace_all(&old, &new)
    }

    /// Right-justifies the content to `width` code units by inserting `fill`
    /// at the front. No-op if the content is already that long.
    pub fn pad_left(&mut self, width: usize, fill: u16) -> Result<()> {
        match width.checked_sub(self.len) {
            Some(count) if count > 0 => self.insert_repeated(0, fill, count),
            _ => Ok(()),
        }
    }

    /// Left-justifies the content to `width` code units by appending `fill`.
    /// No-op if the content is already that long.
    pub fn pad_right(&mut self, width: usize, fill: u16) -> Result<()> {
        match width.checked_sub(self.len) {
            Some(count) if count > 0 => self.push_repeated(fill, count),
            _ => Ok(()),
        }
    }

    /// Appends `count` spaces.
    pub(crate) fn push_spaces(&mut self, count: usize) -> Result<()> {
        self.push_repeated(SPACE, count)
    }

    /// Inserts `count` spaces at `index`.
    pub(crate) fn insert_spaces(&mut self, index: usize, count: usize) -> Result<()> {
        self.insert_repeated(index, SPACE, count)
    }
}

impl<P: BufferPool<u16>> fmt::Write for GrowableBuffer<'_, u16, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s).map_err(|_| fmt::Error)
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.append_char(c).map_err(|_| fmt::Error)
    }
}

impl<P: BufferPool<u16>> fmt::Display for GrowableBuffer<'_, u16, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        for decoded in char::decode_utf16(self.as_slice().iter().copied()) {
            f.write_char(decoded.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl<P: BufferPool<u16>> PartialEq<str> for GrowableBuffer<'_, u16, P> {
    fn eq(&self, other: &str) -> bool {
        self.as_slice().iter().copied().eq(other.encode_utf16())
    }
}

impl<P: BufferPool<u16>> PartialEq<&str> for GrowableBuffer<'_, u16, P> {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}
