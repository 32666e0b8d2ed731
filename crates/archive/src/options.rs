use serde::{Deserialize, Serialize};

/// Limits applied by a [`crate::KeyedArchiver`].
///
/// Missing fields take their defaults when deserialized, so hosts can embed
/// a partial `archive` section in their own configuration.
///
/// ```
/// use keyed_archive::ArchiveOptions;
///
/// let options: ArchiveOptions = serde_json::from_str(r#"{"max_depth": 64}"#).unwrap();
/// assert_eq!(options.max_depth, 64);
/// assert_eq!(options.max_buffer_len, ArchiveOptions::default().max_buffer_len);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    /// Deepest container nesting accepted on encode and decode.
    pub max_depth: usize,
    /// Largest buffer `decode` will look at.
    pub max_buffer_len: usize,
}

impl ArchiveOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 512;
    pub const DEFAULT_MAX_BUFFER_LEN: usize = 64 * 1024 * 1024;
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_buffer_len: Self::DEFAULT_MAX_BUFFER_LEN,
        }
    }
}
