//! Bounds-checked binary reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A binary reader over a borrowed byte slice.
///
/// Every read is checked against the end of the input. A failed read leaves
/// the cursor where it was.
///
/// # Example
///
/// ```
/// use telemetry_buffers::{BufferError, Reader};
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// assert_eq!(reader.u8(), Err(BufferError::EndOfBuffer));
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Number of bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if n > self.remaining() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.array::<1>().map(|b| b[0])
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.array().map(u16::from_be_bytes)
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_be_bytes)
    }

    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.array().map(u64::from_be_bytes)
    }

    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.array().map(f32::from_be_bytes)
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        self.array().map(f64::from_be_bytes)
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.uint8[start..self.x])
    }

    /// Reads a UTF-8 string of `size` bytes.
    ///
    /// On invalid UTF-8 the cursor is left at the start of the string.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        self.check(size)?;
        let start = self.x;
        let s = str::from_utf8(&self.uint8[start..start + size])
            .map_err(|_| BufferError::InvalidUtf8)?;
        self.x += size;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u16(), Ok(0x0203));
        assert_eq!(reader.u32(), Ok(0x04050607));
        assert!(reader.is_exhausted());
    }

    #[test]
    fn partial_read_does_not_advance() {
        let data = [0x01u8];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u16(), Err(BufferError::EndOfBuffer));
        assert_eq!(reader.x, 0);
        assert_eq!(reader.u8(), Ok(0x01));
    }

    #[test]
    fn peek_on_empty() {
        let data: [u8; 0] = [];
        let reader = Reader::new(&data);
        assert_eq!(reader.peek(), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn floats() {
        let mut writer = crate::Writer::new();
        writer.f32(1.5);
        writer.f64(-2.25);
        let data = writer.flush();
        let mut reader = Reader::new(&data);
        assert_eq!(reader.f32(), Ok(1.5));
        assert_eq!(reader.f64(), Ok(-2.25));
    }

    #[test]
    fn u64_max() {
        let data = [0xff; 8];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u64(), Ok(u64::MAX));
    }

    #[test]
    fn buf_and_utf8() {
        let data = b"\x01\x02hello";
        let mut reader = Reader::new(data);
        assert_eq!(reader.buf(2), Ok(&[0x01, 0x02][..]));
        assert_eq!(reader.utf8(5), Ok("hello"));
        assert_eq!(reader.buf(1), Err(BufferError::EndOfBuffer));
    }

    #[test]
    fn invalid_utf8_keeps_cursor() {
        let data = [0xff, 0xfe];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.utf8(2), Err(BufferError::InvalidUtf8));
        assert_eq!(reader.x, 0);
    }

    #[test]
    fn oversized_length_is_end_of_buffer() {
        let data = [0u8; 4];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.buf(usize::MAX), Err(BufferError::EndOfBuffer));
    }
}
