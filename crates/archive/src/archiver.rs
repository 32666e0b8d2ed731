//! `KeyedArchiver`: the archive/unarchive entry points.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::convert::{from_archive_value, to_archive_value};
use crate::decoder::ArchiveDecoder;
use crate::encoder::ArchiveEncoder;
use crate::error::ArchiveError;
use crate::options::ArchiveOptions;
use crate::registry::TypeRegistry;
use crate::value::ArchiveValue;

/// Encodes and decodes keyed archive buffers.
///
/// Holds only immutable options and a registry; every call gets its own
/// scratch state, so one archiver can be shared across threads.
///
/// `encode`/`decode` return `None` on any failure and log why. The `try_*`
/// variants return the [`ArchiveError`] instead.
#[derive(Debug, Clone, Default)]
pub struct KeyedArchiver {
    options: ArchiveOptions,
    registry: TypeRegistry,
}

impl KeyedArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ArchiveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn try_encode(&self, value: &ArchiveValue) -> Result<Vec<u8>, ArchiveError> {
        ArchiveEncoder::new(&self.registry, &self.options).encode(value)
    }

    pub fn try_decode(&self, bytes: &[u8]) -> Result<ArchiveValue, ArchiveError> {
        let max = self.options.max_buffer_len;
        if bytes.len() > max {
            return Err(ArchiveError::BufferTooLarge {
                len: bytes.len(),
                max,
            });
        }
        ArchiveDecoder::new(&self.registry, &self.options).decode(bytes)
    }

    pub fn encode(&self, value: &ArchiveValue) -> Option<Vec<u8>> {
        match self.try_encode(value) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(error = %err, kind = value.kind(), "value cannot be archived");
                None
            }
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Option<ArchiveValue> {
        match self.try_decode(bytes) {
            Ok(value) => Some(value),
            Err(ArchiveError::Empty) => {
                debug!("empty archive buffer");
                None
            }
            Err(err) => {
                warn!(error = %err, len = bytes.len(), "discarding unreadable archive buffer");
                None
            }
        }
    }

    pub fn try_encode_serialize<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ArchiveError> {
        self.try_encode(&to_archive_value(value)?)
    }

    pub fn try_decode_deserialize<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<T, ArchiveError> {
        from_archive_value(self.try_decode(bytes)?)
    }

    /// Archives any serializable value through its JSON data model.
    ///
    /// The value is first converted to `serde_json::Value` and then to an
    /// [`ArchiveValue`], and both conversions recurse before
    /// [`ArchiveOptions::max_depth`] is checked. Only pass values whose
    /// nesting stays in the low thousands. [`KeyedArchiver::encode`] has no
    /// such limit.
    pub fn encode_serialize<T: Serialize + ?Sized>(&self, value: &T) -> Option<Vec<u8>> {
        match self.try_encode_serialize(value) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(error = %err, "value cannot be archived");
                None
            }
        }
    }

    pub fn decode_deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Option<T> {
        match self.try_decode_deserialize(bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, len = bytes.len(), "discarding unreadable archive buffer");
                None
            }
        }
    }
}

/// Archives `value` with default options and an empty registry.
pub fn archive(value: &ArchiveValue) -> Option<Vec<u8>> {
    KeyedArchiver::default().encode(value)
}

/// Unarchives `bytes` with default options and an empty registry.
pub fn unarchive(bytes: &[u8]) -> Option<ArchiveValue> {
    KeyedArchiver::default().decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archiver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyedArchiver>();
    }

    #[test]
    fn buffer_size_limit() {
        let archiver = KeyedArchiver::new().with_options(ArchiveOptions {
            max_buffer_len: 8,
            ..ArchiveOptions::default()
        });
        let bytes = archiver.try_encode(&ArchiveValue::from("long enough")).unwrap();
        assert_eq!(
            archiver.try_decode(&bytes),
            Err(ArchiveError::BufferTooLarge {
                len: bytes.len(),
                max: 8
            })
        );
        assert_eq!(archiver.decode(&bytes), None);
    }

    #[test]
    fn null_roundtrip() {
        let bytes = archive(&ArchiveValue::Null).unwrap();
        assert_eq!(unarchive(&bytes), Some(ArchiveValue::Null));
    }
}
