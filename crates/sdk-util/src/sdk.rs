/// Leading component of [`sdk_name`].
pub const SDK_NAME_PREFIX: &str = "telemetry";

/// SDK name reported with every payload, e.g. `telemetry.linux`.
pub fn sdk_name() -> String {
    format!("{SDK_NAME_PREFIX}.{}", std::env::consts::OS)
}

pub fn sdk_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_carries_os() {
        let name = sdk_name();
        assert!(name.starts_with("telemetry."));
        assert!(name.ends_with(std::env::consts::OS));
    }

    #[test]
    fn version_is_semver() {
        assert_eq!(sdk_version().split('.').count(), 3);
    }
}
