use std::fmt;
use std::sync::Arc;

use keyed_archive::{ArchiveValue, KeyedArchiver};
use tracing::debug;
use uuid::Uuid;

use crate::bundle::Bundle;
use crate::identifier;
use crate::locale::Locale;
use crate::notification::NotificationCenter;
use crate::platform::{Platform, SystemPlatform};
use crate::sdk;

/// Facade over the leaf utilities and the keyed archiver.
///
/// Cheap to clone; clones share the platform handle.
#[derive(Clone)]
pub struct SdkUtility {
    platform: Arc<dyn Platform>,
    archiver: KeyedArchiver,
}

impl SdkUtility {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            archiver: KeyedArchiver::default(),
        }
    }

    /// Utility backed by [`SystemPlatform`].
    pub fn system() -> Self {
        Self::new(Arc::new(SystemPlatform::new()))
    }

    pub fn with_archiver(mut self, archiver: KeyedArchiver) -> Self {
        self.archiver = archiver;
        self
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn archiver(&self) -> &KeyedArchiver {
        &self.archiver
    }

    pub fn sdk_name(&self) -> String {
        sdk::sdk_name()
    }

    pub fn sdk_version(&self) -> &'static str {
        sdk::sdk_version()
    }

    pub fn new_uuid_string(&self) -> String {
        identifier::new_uuid_string()
    }

    pub fn uuid_from_string(&self, s: &str) -> Option<Uuid> {
        identifier::uuid_from_string(s)
    }

    /// The user's locale as of this call, or [`Locale::posix`] when the
    /// platform reports none or something unparseable.
    pub fn current_locale(&self) -> Locale {
        let Some(identifier) = self.platform.locale_identifier() else {
            debug!("no locale reported, using {}", Locale::POSIX_IDENTIFIER);
            return Locale::posix();
        };
        Locale::parse(&identifier).unwrap_or_else(|| {
            debug!(identifier, "unparseable locale, using {}", Locale::POSIX_IDENTIFIER);
            Locale::posix()
        })
    }

    pub fn is_app_extension(&self) -> bool {
        self.main_bundle().is_app_extension()
    }

    pub fn notification_center(&self) -> NotificationCenter {
        self.platform.notification_center()
    }

    pub fn main_bundle(&self) -> Bundle {
        self.platform.main_bundle()
    }

    /// Archives `value`, treating `None` as null.
    pub fn archive_keyed_data(&self, value: Option<&ArchiveValue>) -> Option<Vec<u8>> {
        match value {
            Some(value) => self.archiver.encode(value),
            None => self.archiver.encode(&ArchiveValue::Null),
        }
    }

    pub fn unarchive_keyed_data(&self, bytes: &[u8]) -> Option<ArchiveValue> {
        self.archiver.decode(bytes)
    }
}

impl Default for SdkUtility {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for SdkUtility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkUtility")
            .field("archiver", &self.archiver)
            .finish_non_exhaustive()
    }
}
