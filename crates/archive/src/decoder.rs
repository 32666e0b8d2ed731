//! `ArchiveDecoder`: reads a keyed archive buffer back into an [`ArchiveValue`].
//!
//! Open containers live on a heap-allocated frame stack rather than the call
//! stack, and the stack is capped at `max_depth`. Every length is checked
//! against the remaining input before anything is allocated for it.

use telemetry_buffers::Reader;
use uuid::Uuid;

use crate::constants::*;
use crate::error::ArchiveError;
use crate::options::ArchiveOptions;
use crate::registry::TypeRegistry;
use crate::value::{ArchiveMap, ArchiveValue, TypedValue};

// Upper bound on speculative container preallocation.
const PREALLOC_LIMIT: usize = 1024;

enum Frame {
    Array {
        items: Vec<ArchiveValue>,
        remaining: usize,
    },
    Map {
        entries: ArchiveMap,
        key: Option<String>,
        remaining: usize,
    },
    Typed {
        type_tag: String,
        body: Option<ArchiveValue>,
    },
}

impl Frame {
    fn is_complete(&self) -> bool {
        match self {
            Frame::Array { remaining, .. } | Frame::Map { remaining, .. } => *remaining == 0,
            Frame::Typed { body, .. } => body.is_some(),
        }
    }

    fn accept(&mut self, value: ArchiveValue) -> Result<(), ArchiveError> {
        match self {
            Frame::Array { items, remaining } => {
                items.push(value);
                *remaining -= 1;
            }
            Frame::Map {
                entries,
                key,
                remaining,
            } => {
                let key = key.take().ok_or(ArchiveError::InvalidMapKey)?;
                if entries.contains_key(&key) {
                    return Err(ArchiveError::DuplicateKey(key));
                }
                entries.insert(key, value);
                *remaining -= 1;
            }
            Frame::Typed { body, .. } => *body = Some(value),
        }
        Ok(())
    }
}

enum Head {
    Value(ArchiveValue),
    Open(Frame),
}

pub struct ArchiveDecoder<'r> {
    registry: &'r TypeRegistry,
    max_depth: usize,
}

impl<'r> ArchiveDecoder<'r> {
    pub fn new(registry: &'r TypeRegistry, options: &ArchiveOptions) -> Self {
        Self {
            registry,
            max_depth: options.max_depth,
        }
    }

    /// Decodes a complete archive buffer, header included.
    pub fn decode(&self, buf: &[u8]) -> Result<ArchiveValue, ArchiveError> {
        if buf.is_empty() {
            return Err(ArchiveError::Empty);
        }
        let mut reader = Reader::new(buf);
        let magic = reader
            .buf(MAGIC.len())
            .map_err(|_| ArchiveError::BadMagic)?;
        if magic != MAGIC {
            return Err(ArchiveError::BadMagic);
        }
        let version = reader.u8()?;
        if version == 0 || version > FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }
        let value = self.read_any(&mut reader)?;
        if !reader.is_exhausted() {
            return Err(ArchiveError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }

    /// Reads one archived value starting at the reader's cursor.
    pub fn read_any(&self, reader: &mut Reader<'_>) -> Result<ArchiveValue, ArchiveError> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            if let Some(Frame::Map { key: key @ None, .. }) = stack.last_mut() {
                *key = Some(self.read_text(reader).map_err(|err| match err {
                    ArchiveError::UnsupportedItem(_) => ArchiveError::InvalidMapKey,
                    other => other,
                })?);
                continue;
            }

            let mut value = match self.read_head(reader)? {
                Head::Value(value) => value,
                Head::Open(frame) => {
                    if stack.len() >= self.max_depth {
                        return Err(ArchiveError::DepthLimitExceeded(self.max_depth));
                    }
                    if frame.is_complete() {
                        self.close(frame)?
                    } else {
                        stack.push(frame);
                        continue;
                    }
                }
            };

            loop {
                let Some(top) = stack.last_mut() else {
                    return Ok(value);
                };
                top.accept(value)?;
                if !top.is_complete() {
                    break;
                }
                let Some(frame) = stack.pop() else {
                    break;
                };
                value = self.close(frame)?;
            }
        }
    }

    fn close(&self, frame: Frame) -> Result<ArchiveValue, ArchiveError> {
        Ok(match frame {
            Frame::Array { items, .. } => ArchiveValue::Array(items),
            Frame::Map { entries, .. } => ArchiveValue::Map(entries),
            Frame::Typed { type_tag, body } => {
                let value = body.unwrap_or_default();
                self.registry.check(&type_tag, &value)?;
                ArchiveValue::Typed(Box::new(TypedValue { type_tag, value }))
            }
        })
    }

    fn read_head(&self, reader: &mut Reader<'_>) -> Result<Head, ArchiveError> {
        let byte = reader.u8()?;
        let value = match byte >> 5 {
            MAJOR_UNSIGNED => ArchiveValue::from(read_uint(reader, byte)?),
            MAJOR_NEGATIVE => ArchiveValue::Integer(read_nint(reader, byte)?),
            MAJOR_BYTES => {
                let len = read_len(reader, byte)?;
                ArchiveValue::Bytes(reader.buf(len)?.to_vec())
            }
            MAJOR_STR => {
                let len = read_len(reader, byte)?;
                ArchiveValue::Str(reader.utf8(len)?.to_owned())
            }
            MAJOR_ARRAY => {
                let len = read_len(reader, byte)?;
                if len > reader.remaining() {
                    return Err(ArchiveError::Truncated);
                }
                return Ok(Head::Open(Frame::Array {
                    items: Vec::with_capacity(len.min(PREALLOC_LIMIT)),
                    remaining: len,
                }));
            }
            MAJOR_MAP => {
                let len = read_len(reader, byte)?;
                if len.saturating_mul(2) > reader.remaining() {
                    return Err(ArchiveError::Truncated);
                }
                return Ok(Head::Open(Frame::Map {
                    entries: ArchiveMap::with_capacity(len.min(PREALLOC_LIMIT)),
                    key: None,
                    remaining: len,
                }));
            }
            MAJOR_TAG => {
                let tag = read_uint(reader, byte)?;
                return self.read_tagged(reader, tag);
            }
            _ => match byte {
                FALSE => ArchiveValue::Bool(false),
                TRUE => ArchiveValue::Bool(true),
                NULL => ArchiveValue::Null,
                FLOAT16 | FLOAT32 | FLOAT64 => ArchiveValue::Float(read_float(reader, byte)?),
                _ => return Err(ArchiveError::UnsupportedItem(byte)),
            },
        };
        Ok(Head::Value(value))
    }

    fn read_tagged(&self, reader: &mut Reader<'_>, tag: u64) -> Result<Head, ArchiveError> {
        match tag {
            TAG_EPOCH_DATE => {
                let secs = read_number(reader).map_err(|err| invalid("date", err))?;
                Ok(Head::Value(ArchiveValue::Date(secs)))
            }
            TAG_UUID => {
                let byte = reader.u8()?;
                if byte >> 5 != MAJOR_BYTES {
                    return Err(invalid("uuid", ArchiveError::UnsupportedItem(byte)));
                }
                let len = read_len(reader, byte)?;
                let id = Uuid::from_slice(reader.buf(len)?).map_err(|err| {
                    ArchiveError::InvalidTypedValue {
                        type_tag: "uuid".into(),
                        reason: err.to_string(),
                    }
                })?;
                Ok(Head::Value(ArchiveValue::Uuid(id)))
            }
            TAG_TYPED => {
                let byte = reader.u8()?;
                if byte != OVERLAY_ARR | 2 {
                    return Err(invalid("typed", ArchiveError::UnsupportedItem(byte)));
                }
                let type_tag = self.read_text(reader)?;
                if !self.registry.contains(&type_tag) {
                    return Err(ArchiveError::UnknownType(type_tag));
                }
                Ok(Head::Open(Frame::Typed {
                    type_tag,
                    body: None,
                }))
            }
            other => Err(ArchiveError::UnknownTag(other)),
        }
    }

    fn read_text(&self, reader: &mut Reader<'_>) -> Result<String, ArchiveError> {
        let byte = reader.u8()?;
        if byte >> 5 != MAJOR_STR {
            return Err(ArchiveError::UnsupportedItem(byte));
        }
        let len = read_len(reader, byte)?;
        Ok(reader.utf8(len)?.to_owned())
    }
}

fn invalid(type_tag: &str, err: ArchiveError) -> ArchiveError {
    ArchiveError::InvalidTypedValue {
        type_tag: type_tag.to_owned(),
        reason: err.to_string(),
    }
}

fn read_uint(reader: &mut Reader<'_>, byte: u8) -> Result<u64, ArchiveError> {
    Ok(match byte & 0x1f {
        info @ 0..=23 => u64::from(info),
        24 => u64::from(reader.u8()?),
        25 => u64::from(reader.u16()?),
        26 => u64::from(reader.u32()?),
        27 => reader.u64()?,
        // Archives only use definite lengths.
        INDEFINITE => return Err(ArchiveError::UnsupportedItem(byte)),
        // 28..=30 are reserved.
        _ => return Err(ArchiveError::UnsupportedItem(byte)),
    })
}

fn read_nint(reader: &mut Reader<'_>, byte: u8) -> Result<i64, ArchiveError> {
    let uint = read_uint(reader, byte)?;
    let uint = i64::try_from(uint).map_err(|_| ArchiveError::IntegerOverflow)?;
    Ok(-1 - uint)
}

fn read_len(reader: &mut Reader<'_>, byte: u8) -> Result<usize, ArchiveError> {
    let len = read_uint(reader, byte)?;
    usize::try_from(len).map_err(|_| ArchiveError::Truncated)
}

fn read_float(reader: &mut Reader<'_>, byte: u8) -> Result<f64, ArchiveError> {
    Ok(match byte {
        FLOAT16 => f16_to_f64(reader.u16()?),
        FLOAT32 => f64::from(reader.f32()?),
        FLOAT64 => reader.f64()?,
        _ => return Err(ArchiveError::UnsupportedItem(byte)),
    })
}

// Integer or float scalar, read without going through `read_head`.
fn read_number(reader: &mut Reader<'_>) -> Result<f64, ArchiveError> {
    let byte = reader.u8()?;
    match byte >> 5 {
        MAJOR_UNSIGNED => Ok(read_uint(reader, byte)? as f64),
        MAJOR_NEGATIVE => Ok(read_nint(reader, byte)? as f64),
        _ => read_float(reader, byte),
    }
}

fn f16_to_f64(bits: u16) -> f64 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exp = i32::from((bits >> 10) & 0x1f);
    let mant = f64::from(bits & 0x3ff);
    let magnitude = match exp {
        0 => mant * 2f64.powi(-24),
        31 if mant == 0.0 => f64::INFINITY,
        31 => f64::NAN,
        _ => (1.0 + mant / 1024.0) * 2f64.powi(exp - 15),
    };
    sign * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_body(body: &[u8]) -> Result<ArchiveValue, ArchiveError> {
        let registry = TypeRegistry::new();
        let mut buf = MAGIC.to_vec();
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(body);
        ArchiveDecoder::new(&registry, &ArchiveOptions::default()).decode(&buf)
    }

    #[test]
    fn scalars() {
        assert_eq!(decode_body(&[0xf6]), Ok(ArchiveValue::Null));
        assert_eq!(decode_body(&[0xf5]), Ok(ArchiveValue::Bool(true)));
        assert_eq!(decode_body(&[0x19, 0x03, 0xe8]), Ok(ArchiveValue::Integer(1000)));
        assert_eq!(decode_body(&[0x38, 0x18]), Ok(ArchiveValue::Integer(-25)));
        assert_eq!(
            decode_body(&[0x43, 1, 2, 3]),
            Ok(ArchiveValue::Bytes(vec![1, 2, 3]))
        );
        assert_eq!(decode_body(&[0x62, b'h', b'i']), Ok(ArchiveValue::from("hi")));
    }

    #[test]
    fn half_floats() {
        assert_eq!(decode_body(&[0xf9, 0x3c, 0x00]), Ok(ArchiveValue::Float(1.0)));
        assert_eq!(decode_body(&[0xf9, 0x7b, 0xff]), Ok(ArchiveValue::Float(65504.0)));
        assert_eq!(decode_body(&[0xf9, 0xc0, 0x00]), Ok(ArchiveValue::Float(-2.0)));
        assert_eq!(
            decode_body(&[0xf9, 0x7c, 0x00]),
            Ok(ArchiveValue::Float(f64::INFINITY))
        );
    }

    #[test]
    fn date_accepts_integer_seconds() {
        assert_eq!(
            decode_body(&[0xc1, 0x1a, 0x65, 0x53, 0xf1, 0x00]),
            Ok(ArchiveValue::Date(1_700_000_000.0))
        );
        assert!(matches!(
            decode_body(&[0xc1, 0x61, b'x']),
            Err(ArchiveError::InvalidTypedValue { .. })
        ));
    }

    #[test]
    fn negative_below_i64_min_overflows() {
        assert_eq!(
            decode_body(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(ArchiveError::IntegerOverflow)
        );
    }

    #[test]
    fn map_key_must_be_text() {
        assert_eq!(decode_body(&[0xa1, 0x01, 0x02]), Err(ArchiveError::InvalidMapKey));
    }

    #[test]
    fn duplicate_map_key() {
        assert_eq!(
            decode_body(&[0xa2, 0x61, b'a', 0x01, 0x61, b'a', 0x02]),
            Err(ArchiveError::DuplicateKey("a".into()))
        );
    }

    #[test]
    fn indefinite_length_is_unsupported() {
        assert_eq!(
            decode_body(&[0x9f, 0x01, 0xff]),
            Err(ArchiveError::UnsupportedItem(0x9f))
        );
        assert_eq!(
            decode_body(&[OVERLAY_STR | INDEFINITE, 0x61, 0x61, 0xff]),
            Err(ArchiveError::UnsupportedItem(0x7f))
        );
        assert_eq!(
            decode_body(&[0x1c]),
            Err(ArchiveError::UnsupportedItem(0x1c))
        );
    }

    #[test]
    fn undefined_is_unsupported() {
        assert_eq!(decode_body(&[0xf7]), Err(ArchiveError::UnsupportedItem(0xf7)));
    }

    #[test]
    fn oversized_container_length_is_truncated() {
        assert_eq!(
            decode_body(&[0x9b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(ArchiveError::Truncated)
        );
        assert_eq!(decode_body(&[0xa2, 0x61, b'a']), Err(ArchiveError::Truncated));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(decode_body(&[0x80]), Ok(ArchiveValue::Array(vec![])));
        assert_eq!(decode_body(&[0xa0]), Ok(ArchiveValue::Map(ArchiveMap::new())));
    }

    #[test]
    fn unknown_tags() {
        assert_eq!(decode_body(&[0xc2, 0x41, 0x01]), Err(ArchiveError::UnknownTag(2)));
        assert_eq!(
            decode_body(&[0xd8, 27, 0x82, 0x63, b'F', b'o', b'o', 0xf6]),
            Err(ArchiveError::UnknownType("Foo".into()))
        );
    }

    #[test]
    fn header_errors() {
        let registry = TypeRegistry::new();
        let decoder = ArchiveDecoder::new(&registry, &ArchiveOptions::default());
        assert_eq!(decoder.decode(&[]), Err(ArchiveError::Empty));
        assert_eq!(decoder.decode(b"KA"), Err(ArchiveError::BadMagic));
        assert_eq!(decoder.decode(b"NOPE\x01\xf6"), Err(ArchiveError::BadMagic));
        assert_eq!(decoder.decode(b"KARC"), Err(ArchiveError::Truncated));
        assert_eq!(
            decoder.decode(b"KARC\x02\xf6"),
            Err(ArchiveError::UnsupportedVersion(2))
        );
        assert_eq!(
            decoder.decode(b"KARC\x01\xf6\xf6"),
            Err(ArchiveError::TrailingBytes(1))
        );
    }

    #[test]
    fn depth_limit_on_decode() {
        let registry = TypeRegistry::new();
        let options = ArchiveOptions {
            max_depth: 2,
            ..ArchiveOptions::default()
        };
        let decoder = ArchiveDecoder::new(&registry, &options);
        assert!(decoder.decode(b"KARC\x01\x81\x80").is_ok());
        assert_eq!(
            decoder.decode(b"KARC\x01\x81\x81\x80"),
            Err(ArchiveError::DepthLimitExceeded(2))
        );
    }
}
