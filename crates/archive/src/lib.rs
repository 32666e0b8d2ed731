//! Keyed archive: a self-describing binary codec for telemetry value graphs.
//!
//! An archive buffer is the 4-byte magic `KARC`, a format version byte, and a
//! single CBOR data item. Decoding never panics on foreign, truncated or
//! corrupted input; the [`archive`]/[`unarchive`] entry points simply return
//! `None`.
//!
//! ```
//! use keyed_archive::{archive, unarchive, ArchiveValue};
//!
//! let value = ArchiveValue::map([
//!     ("name", ArchiveValue::from("session")),
//!     ("count", ArchiveValue::from(3)),
//! ]);
//! let bytes = archive(&value).unwrap();
//! assert_eq!(unarchive(&bytes), Some(value));
//! assert_eq!(unarchive(&bytes[..bytes.len() - 1]), None);
//! ```

mod archiver;
mod constants;
mod convert;
mod decoder;
mod encoder;
mod error;
mod options;
mod registry;
mod value;

pub use archiver::{archive, unarchive, KeyedArchiver};
pub use constants::{FORMAT_VERSION, MAGIC, TAG_EPOCH_DATE, TAG_TYPED, TAG_UUID};
pub use convert::{from_archive_value, to_archive_value};
pub use decoder::ArchiveDecoder;
pub use encoder::ArchiveEncoder;
pub use error::ArchiveError;
pub use options::ArchiveOptions;
pub use registry::{Archive, DecodeRule, TypeRegistry};
pub use value::{ArchiveMap, ArchiveValue, TypedValue};
