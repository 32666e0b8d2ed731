//! Ambient helpers for the telemetry SDK: identifiers, locale, bundle
//! introspection, notifications and keyed archiving.
//!
//! ```
//! use telemetry_util::{ArchiveValue, SdkUtility};
//!
//! let util = SdkUtility::system();
//! let id = util.new_uuid_string();
//! assert_eq!(util.uuid_from_string(&id).map(|u| telemetry_util::uuid_to_string(&u)), Some(id));
//!
//! let bytes = util.archive_keyed_data(Some(&ArchiveValue::from("hello"))).unwrap();
//! assert_eq!(util.unarchive_keyed_data(&bytes), Some(ArchiveValue::from("hello")));
//! ```

mod bundle;
mod identifier;
mod locale;
mod notification;
mod platform;
mod sdk;
mod utility;

pub use bundle::{is_app_extension_path, Bundle, APP_EXTENSION_MARKER};
pub use identifier::{
    new_uuid, new_uuid_string, new_uuid_with, uuid_from_string, uuid_to_string, UUID_STRING_LEN,
};
pub use keyed_archive::{ArchiveValue, KeyedArchiver};
pub use locale::Locale;
pub use notification::{Notification, NotificationCenter, ObserverToken};
pub use platform::{Platform, SystemPlatform};
pub use sdk::{sdk_name, sdk_version, SDK_NAME_PREFIX};
pub use utility::SdkUtility;
