//! Type registry: decode rules for application-defined values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ArchiveError;
use crate::value::ArchiveValue;

/// An application type that can be stored in a keyed archive.
///
/// `TYPE_TAG` is written into every archive holding the type, so it must stay
/// stable across releases.
pub trait Archive: Sized {
    const TYPE_TAG: &'static str;

    fn archive(&self) -> Result<ArchiveValue, ArchiveError>;

    fn unarchive(value: &ArchiveValue) -> Result<Self, ArchiveError>;
}

/// Checks an archived body before the decoder accepts it.
pub type DecodeRule = Arc<dyn Fn(&ArchiveValue) -> Result<(), ArchiveError> + Send + Sync>;

/// Maps type tags to the rule used to accept their archived bodies.
///
/// A [`crate::KeyedArchiver`] refuses to encode a [`ArchiveValue::Typed`]
/// whose tag is missing here, and decoding such a tag yields no value.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    rules: HashMap<String, DecodeRule>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`; its bodies are accepted when `T::unarchive` succeeds.
    pub fn register<T: Archive + 'static>(&mut self) -> &mut Self {
        self.register_rule(T::TYPE_TAG, |value| T::unarchive(value).map(|_| ()))
    }

    /// Registers a tag with a custom rule.
    pub fn register_rule<F>(&mut self, type_tag: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&ArchiveValue) -> Result<(), ArchiveError> + Send + Sync + 'static,
    {
        self.rules.insert(type_tag.into(), Arc::new(rule));
        self
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.rules.contains_key(type_tag)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs the rule registered for `type_tag` against `value`.
    pub fn check(&self, type_tag: &str, value: &ArchiveValue) -> Result<(), ArchiveError> {
        let rule = self
            .rules
            .get(type_tag)
            .ok_or_else(|| ArchiveError::UnknownType(type_tag.to_owned()))?;
        rule(value).map_err(|err| match err {
            ArchiveError::InvalidTypedValue { .. } => err,
            other => ArchiveError::InvalidTypedValue {
                type_tag: type_tag.to_owned(),
                reason: other.to_string(),
            },
        })
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.rules.keys().collect();
        tags.sort();
        f.debug_struct("TypeRegistry").field("tags", &tags).finish()
    }
}
