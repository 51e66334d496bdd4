// Relayout Input Layer - Device Filtering
// Path glob and name bypass rules applied while scanning for devices

use crate::config::ConfigError;
use globset::{Glob, GlobMatcher};
use regex::Regex;
use std::path::Path;

/// Name prefix of the daemon's own virtual keyboard
pub const VIRTUAL_DEVICE_PREFIX: &str = "Relayout (virtual)";

/// Decides which device nodes are opened.
#[derive(Debug, Clone)]
pub struct DeviceFilter {
    search: GlobMatcher,
    bypass: Option<Regex>,
}

impl DeviceFilter {
    /// Build a filter from the `[ScanDevices]` `Search` glob and `Bypass` regex.
    /// An empty bypass pattern bypasses nothing.
    pub fn new(search: &str, bypass: &str) -> Result<Self, ConfigError> {
        let search = Glob::new(search)
            .map_err(|e| ConfigError::InvalidSearchGlob(search.to_string(), e.to_string()))?
            .compile_matcher();
        let bypass = if bypass.is_empty() {
            None
        } else {
            Some(
                Regex::new(bypass)
                    .map_err(|e| ConfigError::InvalidBypass(bypass.to_string(), e.to_string()))?,
            )
        };
        Ok(Self { search, bypass })
    }

    /// Whether a device node path matches the search glob
    pub fn matches_path(&self, path: &Path) -> bool {
        self.search.is_match(path)
    }

    /// Whether a device with this name is skipped
    pub fn bypasses(&self, name: &str) -> bool {
        super::is_virtual_device(name, VIRTUAL_DEVICE_PREFIX)
            || self.bypass.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Combined check used while enumerating devices
    pub fn accepts(&self, path: &Path, name: &str) -> bool {
        self.matches_path(path) && !self.bypasses(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_glob() {
        let filter = DeviceFilter::new("/dev/input/event*", "").unwrap();
        assert!(filter.matches_path(Path::new("/dev/input/event0")));
        assert!(filter.matches_path(Path::new("/dev/input/event12")));
        assert!(!filter.matches_path(Path::new("/dev/input/mouse0")));
    }

    #[test]
    fn test_bypass_is_case_insensitive_when_asked() {
        let filter = DeviceFilter::new("/dev/input/event*", "(?i)Video|Camera").unwrap();
        assert!(filter.bypasses("Integrated camera"));
        assert!(filter.bypasses("Video Bus"));
        assert!(!filter.bypasses("AT Translated Set 2 keyboard"));
    }

    #[test]
    fn test_own_virtual_device_is_always_bypassed() {
        let filter = DeviceFilter::new("/dev/input/event*", "").unwrap();
        assert!(filter.bypasses("Relayout (virtual) Keyboard"));
        assert!(!filter.accepts(Path::new("/dev/input/event3"), "Relayout (virtual) Keyboard"));
        assert!(filter.accepts(Path::new("/dev/input/event3"), "USB Keyboard"));
    }

    #[test]
    fn test_invalid_patterns_are_config_errors() {
        assert!(matches!(
            DeviceFilter::new("/dev/input/[event", ""),
            Err(ConfigError::InvalidSearchGlob(_, _))
        ));
        assert!(matches!(
            DeviceFilter::new("/dev/input/event*", "(unclosed"),
            Err(ConfigError::InvalidBypass(_, _))
        ));
    }
}
