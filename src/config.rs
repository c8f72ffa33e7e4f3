//! Plugin configuration.
//!
//! Mirrors the teacher's `Opts`/`Target` builder pattern: a small struct
//! with sensible defaults, adjusted through setters rather than public
//! field mutation, so new options can be added without breaking callers.

use std::path::{Path, PathBuf};

/// Runtime configuration for [`crate::plugin::AiwcPlugin`].
#[derive(Debug, Clone)]
pub struct AiwcConfig {
    enabled: bool,
    output_dir: PathBuf,
}

impl Default for AiwcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AiwcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the plugin should instrument at all. A disabled plugin's
    /// hooks are all no-ops; set this from the host's own activation flag
    /// (e.g. an environment variable or CLI switch) rather than
    /// hard-coding it here.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Directory the per-kernel and host-transfer CSVs are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_to_enabled_with_current_dir() {
        let config = AiwcConfig::new();
        assert!(config.enabled());
        assert_eq!(config.output_dir(), Path::new("."));
    }

    #[test]
    fn setters_chain() {
        let config = AiwcConfig::new().set_enabled(false).set_output_dir("/tmp/aiwc");
        assert!(!config.enabled());
        assert_eq!(config.output_dir(), Path::new("/tmp/aiwc"));
    }
}
