//! Reader-extension configuration.
//!
//! The only knob today is the manifest-scan toggle. Hosts usually build the
//! config once at startup with [`ReaderConfig::from_env`]; tests construct
//! configs directly and never touch the process environment.

use std::env;

/// Environment variable gating the installed-package manifest scan.
pub const MANIFEST_TOGGLE_ENV: &str = "SABLE_USE_MANIFEST_TAG_READERS";

#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Whether the manifest scanner may query the package manifest system.
    /// When off, the manifest lookup is never invoked at all.
    pub use_manifest_readers: bool,
}

impl ReaderConfig {
    /// Read the toggle from the process environment.
    pub fn from_env() -> Self {
        let use_manifest_readers = env::var(MANIFEST_TOGGLE_ENV)
            .map(|value| truthy(&value))
            .unwrap_or(false);
        Self {
            use_manifest_readers,
        }
    }

    pub fn with_manifest_readers(mut self, enabled: bool) -> Self {
        self.use_manifest_readers = enabled;
        self
    }
}

fn truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}
