//! Binary buffer writer with auto-growing capacity.

/// Returns `true` when `value` survives a round trip through `f32` unchanged.
pub fn is_float32(value: f64) -> bool {
    (value as f32) as f64 == value
}

/// A binary buffer writer that grows automatically as needed.
///
/// All multi-byte values are written big-endian.
///
/// # Example
///
/// ```
/// use telemetry_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// let data = writer.flush();
/// assert_eq!(data, [0x01, 0x02, 0x03]);
/// ```
#[derive(Debug, Default)]
pub struct Writer {
    uint8: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with room for `capacity` bytes before it has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written since the last flush.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    /// Drops everything written since the last flush.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Returns the written data and leaves the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a marker byte followed by a u16.
    pub fn u8u16(&mut self, marker: u8, val: u16) {
        self.u8(marker);
        self.u16(val);
    }

    /// Writes a marker byte followed by a u32.
    pub fn u8u32(&mut self, marker: u8, val: u32) {
        self.u8(marker);
        self.u32(val);
    }

    /// Writes a marker byte followed by a u64.
    pub fn u8u64(&mut self, marker: u8, val: u64) {
        self.u8(marker);
        self.u64(val);
    }

    /// Writes a marker byte followed by a f32.
    pub fn u8f32(&mut self, marker: u8, val: f32) {
        self.u8(marker);
        self.f32(val);
    }

    /// Writes a marker byte followed by a f64.
    pub fn u8f64(&mut self, marker: u8, val: f64) {
        self.u8(marker);
        self.f64(val);
    }

    pub fn buf(&mut self, buf: &[u8]) {
        self.uint8.extend_from_slice(buf);
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.uint8.extend_from_slice(s.as_bytes());
        s.len()
    }
}
