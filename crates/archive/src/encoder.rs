//! `ArchiveEncoder`: writes an [`ArchiveValue`] as a keyed archive buffer.
//!
//! The body is a single CBOR data item using definite lengths only. Containers
//! are walked with an explicit work-list, so deep graphs never recurse on the
//! call stack.

use telemetry_buffers::{is_float32, Writer};

use crate::constants::*;
use crate::error::ArchiveError;
use crate::options::ArchiveOptions;
use crate::registry::TypeRegistry;
use crate::value::{ArchiveValue, TypedValue};

enum Step<'v> {
    Value(&'v ArchiveValue, usize),
    Key(&'v str),
}

pub struct ArchiveEncoder<'r> {
    pub writer: Writer,
    registry: &'r TypeRegistry,
    max_depth: usize,
}

impl<'r> ArchiveEncoder<'r> {
    pub fn new(registry: &'r TypeRegistry, options: &ArchiveOptions) -> Self {
        Self {
            writer: Writer::with_capacity(256),
            registry,
            max_depth: options.max_depth,
        }
    }

    /// Encodes `value` with the archive header. Nothing is returned on error.
    pub fn encode(&mut self, value: &ArchiveValue) -> Result<Vec<u8>, ArchiveError> {
        self.writer.reset();
        self.writer.buf(&MAGIC);
        self.writer.u8(FORMAT_VERSION);
        if let Err(err) = self.write_any(value) {
            self.writer.reset();
            return Err(err);
        }
        Ok(self.writer.flush())
    }

    /// Writes the body of `value` without a header.
    pub fn write_any(&mut self, value: &ArchiveValue) -> Result<(), ArchiveError> {
        let mut stack = vec![Step::Value(value, 0)];
        while let Some(step) = stack.pop() {
            let (value, depth) = match step {
                Step::Key(key) => {
                    self.write_str(key);
                    continue;
                }
                Step::Value(value, depth) => (value, depth),
            };
            match value {
                ArchiveValue::Null => self.write_null(),
                ArchiveValue::Bool(b) => self.write_boolean(*b),
                ArchiveValue::Integer(i) => self.write_integer(*i),
                ArchiveValue::UInteger(u) => self.write_u_integer(*u),
                ArchiveValue::Float(f) => self.write_float(*f),
                ArchiveValue::Bytes(b) => self.write_bin(b),
                ArchiveValue::Str(s) => self.write_str(s),
                ArchiveValue::Uuid(id) => {
                    self.write_tag_hdr(TAG_UUID);
                    self.write_bin(id.as_bytes());
                }
                ArchiveValue::Date(secs) => {
                    self.write_tag_hdr(TAG_EPOCH_DATE);
                    self.write_float(*secs);
                }
                ArchiveValue::Array(items) => {
                    self.enter(depth)?;
                    self.write_arr_hdr(items.len());
                    stack.extend(items.iter().rev().map(|item| Step::Value(item, depth + 1)));
                }
                ArchiveValue::Map(map) => {
                    self.enter(depth)?;
                    self.write_obj_hdr(map.len());
                    for (key, item) in map.iter().rev() {
                        stack.push(Step::Value(item, depth + 1));
                        stack.push(Step::Key(key));
                    }
                }
                ArchiveValue::Typed(typed) => {
                    self.enter(depth)?;
                    self.check_typed(typed)?;
                    self.write_tag_hdr(TAG_TYPED);
                    self.write_arr_hdr(2);
                    self.write_str(&typed.type_tag);
                    stack.push(Step::Value(&typed.value, depth + 1));
                }
            }
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<(), ArchiveError> {
        if depth >= self.max_depth {
            Err(ArchiveError::DepthLimitExceeded(self.max_depth))
        } else {
            Ok(())
        }
    }

    // The body must pass the same rule the decoder will apply.
    fn check_typed(&self, typed: &TypedValue) -> Result<(), ArchiveError> {
        self.registry
            .check(&typed.type_tag, &typed.value)
            .map_err(|err| match err {
                ArchiveError::UnknownType(tag) => ArchiveError::UnsupportedType(tag),
                other => other,
            })
    }

    fn write_hdr(&mut self, overlay: u8, n: u64) {
        let w = &mut self.writer;
        if n <= 23 {
            w.u8(overlay | n as u8);
        } else if n <= 0xff {
            w.u8(overlay | 24);
            w.u8(n as u8);
        } else if n <= 0xffff {
            w.u8u16(overlay | 25, n as u16);
        } else if n <= 0xffff_ffff {
            w.u8u32(overlay | 26, n as u32);
        } else {
            w.u8u64(overlay | 27, n);
        }
    }

    pub fn write_null(&mut self) {
        self.writer.u8(NULL);
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.writer.u8(if b { TRUE } else { FALSE });
    }

    pub fn write_integer(&mut self, int: i64) {
        if int >= 0 {
            self.write_u_integer(int as u64);
        } else {
            self.encode_nint(int);
        }
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        self.write_hdr(OVERLAY_UIN, uint);
    }

    pub fn encode_nint(&mut self, int: i64) {
        let uint = (-1i64).wrapping_sub(int) as u64;
        self.write_hdr(OVERLAY_NIN, uint);
    }

    /// Uses f32 if the value fits losslessly, otherwise f64.
    pub fn write_float(&mut self, float: f64) {
        if is_float32(float) {
            self.writer.u8f32(FLOAT32, float as f32);
        } else {
            self.writer.u8f64(FLOAT64, float);
        }
    }

    pub fn write_bin(&mut self, buf: &[u8]) {
        self.write_bin_hdr(buf.len());
        self.writer.buf(buf);
    }

    pub fn write_bin_hdr(&mut self, length: usize) {
        self.write_hdr(OVERLAY_BIN, length as u64);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_str_hdr(s.len());
        self.writer.utf8(s);
    }

    pub fn write_str_hdr(&mut self, length: usize) {
        self.write_hdr(OVERLAY_STR, length as u64);
    }

    pub fn write_arr_hdr(&mut self, length: usize) {
        self.write_hdr(OVERLAY_ARR, length as u64);
    }

    pub fn write_obj_hdr(&mut self, length: usize) {
        self.write_hdr(OVERLAY_MAP, length as u64);
    }

    pub fn write_tag_hdr(&mut self, tag: u64) {
        self.write_hdr(OVERLAY_TAG, tag);
    }
}
