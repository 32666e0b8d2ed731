//! Main bundle descriptor and app-extension detection.

use std::path::{Path, PathBuf};

/// Path fragment present in every executable launched from an app extension.
pub const APP_EXTENSION_MARKER: &str = ".appex/";

const BUNDLE_EXTENSIONS: [&str; 3] = ["app", "appex", "framework"];

/// Whether `executable` lives inside an `.appex` bundle.
pub fn is_app_extension_path(executable: &Path) -> bool {
    executable.to_string_lossy().contains(APP_EXTENSION_MARKER)
}

/// Read-only description of the bundle the running executable belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    executable_path: Option<PathBuf>,
    bundle_path: Option<PathBuf>,
}

impl Bundle {
    /// Describes the bundle around `executable`.
    ///
    /// The bundle path is the closest `.app`, `.appex` or `.framework`
    /// ancestor, falling back to the directory holding the executable.
    pub fn from_executable(executable: Option<PathBuf>) -> Self {
        let bundle_path = executable.as_deref().and_then(|exe| {
            exe.ancestors()
                .skip(1)
                .find(|dir| {
                    dir.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| BUNDLE_EXTENSIONS.contains(&ext))
                })
                .or_else(|| exe.parent())
                .map(Path::to_path_buf)
        });
        Self {
            executable_path: executable,
            bundle_path,
        }
    }

    pub fn executable_path(&self) -> Option<&Path> {
        self.executable_path.as_deref()
    }

    pub fn bundle_path(&self) -> Option<&Path> {
        self.bundle_path.as_deref()
    }

    /// Bundle directory name without its extension, e.g. `Widget` for `Widget.appex`.
    pub fn name(&self) -> Option<&str> {
        self.bundle_path
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|stem| stem.to_str())
    }

    pub fn is_app_extension(&self) -> bool {
        self.executable_path
            .as_deref()
            .is_some_and(is_app_extension_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_executable() {
        let bundle = Bundle::from_executable(Some(PathBuf::from(
            "/private/var/containers/Bundle/Application/ABC/Host.app/PlugIns/Widget.appex/Widget",
        )));
        assert!(bundle.is_app_extension());
        assert_eq!(bundle.name(), Some("Widget"));
        assert!(bundle.bundle_path().unwrap().ends_with("Widget.appex"));
    }

    #[test]
    fn application_executable() {
        let bundle = Bundle::from_executable(Some(PathBuf::from(
            "/var/containers/Bundle/Application/ABC/Host.app/Host",
        )));
        assert!(!bundle.is_app_extension());
        assert_eq!(bundle.name(), Some("Host"));
    }

    #[test]
    fn plain_binary_uses_parent_directory() {
        let bundle = Bundle::from_executable(Some(PathBuf::from("/usr/local/bin/agent")));
        assert_eq!(bundle.bundle_path(), Some(Path::new("/usr/local/bin")));
        assert_eq!(bundle.name(), Some("bin"));
    }

    #[test]
    fn appex_name_without_trailing_slash_is_not_an_extension() {
        assert!(!is_app_extension_path(Path::new("/tmp/Widget.appex")));
        assert!(is_app_extension_path(Path::new("/tmp/Widget.appex/Widget")));
    }

    #[test]
    fn unknown_executable() {
        let bundle = Bundle::from_executable(None);
        assert_eq!(bundle, Bundle::default());
        assert!(!bundle.is_app_extension());
        assert_eq!(bundle.name(), None);
    }
}
