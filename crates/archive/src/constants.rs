// Archive header and the CBOR subset the archive body uses.

/// Leading bytes of every archive buffer.
pub const MAGIC: [u8; 4] = *b"KARC";
/// Format version written by this codec. Older versions stay decodable.
pub const FORMAT_VERSION: u8 = 1;

pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_STR: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;

pub const OVERLAY_UIN: u8 = MAJOR_UNSIGNED << 5;
pub const OVERLAY_NIN: u8 = MAJOR_NEGATIVE << 5;
pub const OVERLAY_BIN: u8 = MAJOR_BYTES << 5;
pub const OVERLAY_STR: u8 = MAJOR_STR << 5;
pub const OVERLAY_ARR: u8 = MAJOR_ARRAY << 5;
pub const OVERLAY_MAP: u8 = MAJOR_MAP << 5;
pub const OVERLAY_TAG: u8 = MAJOR_TAG << 5;

pub const FALSE: u8 = 0xf4;
pub const TRUE: u8 = 0xf5;
pub const NULL: u8 = 0xf6;
pub const FLOAT16: u8 = 0xf9;
pub const FLOAT32: u8 = 0xfa;
pub const FLOAT64: u8 = 0xfb;

/// Additional-info value for indefinite-length items.
pub const INDEFINITE: u8 = 31;

/// Epoch-based date/time.
pub const TAG_EPOCH_DATE: u64 = 1;
/// Typed object: `[type tag, body]`.
pub const TAG_TYPED: u64 = 27;
/// Binary UUID.
pub const TAG_UUID: u64 = 37;
