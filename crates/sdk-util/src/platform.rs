//! Platform capabilities the utilities query instead of reaching for globals.

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::bundle::Bundle;
use crate::notification::NotificationCenter;

const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Host services consulted by [`SdkUtility`](crate::SdkUtility).
///
/// Every method is a fresh query; implementations must not cache values
/// that can change while the process runs, such as the locale.
pub trait Platform: Send + Sync {
    /// Raw identifier of the user's current locale, e.g. `en_US.UTF-8`.
    fn locale_identifier(&self) -> Option<String>;

    fn executable_path(&self) -> Option<PathBuf>;

    /// Handle to the process-wide notification center.
    fn notification_center(&self) -> NotificationCenter;

    fn main_bundle(&self) -> Bundle {
        Bundle::from_executable(self.executable_path())
    }
}

/// [`Platform`] backed by the process environment.
#[derive(Debug, Clone, Default)]
pub struct SystemPlatform {
    notifications: NotificationCenter,
}

impl SystemPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for SystemPlatform {
    fn locale_identifier(&self) -> Option<String> {
        LOCALE_VARS
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.is_empty())
    }

    fn executable_path(&self) -> Option<PathBuf> {
        match env::current_exe() {
            Ok(path) => Some(path),
            Err(error) => {
                debug!(%error, "executable path unavailable");
                None
            }
        }
    }

    fn notification_center(&self) -> NotificationCenter {
        self.notifications.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_platform_reports_test_binary() {
        let platform = SystemPlatform::new();
        let exe = platform.executable_path().unwrap();
        assert!(exe.is_absolute());
        assert_eq!(platform.main_bundle().executable_path(), Some(exe.as_path()));
    }

    #[test]
    fn notification_center_is_shared() {
        let platform = SystemPlatform::new();
        assert!(platform
            .notification_center()
            .same_center(&platform.notification_center()));
    }
}
