//! Trigger configuration
//!
//! `TriggerOptions` is what discovery strategies read. `Settings` is the
//! on-disk shape, loaded from TOML:
//!
//! ```toml
//! [triggers]
//! max_recursion = 25
//!
//! [logging]
//! profile = "production"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::errors::{Result, TriggerError};
use crate::logging_facility::Profile;

/// Default cap on recursive discovery iterations
pub const DEFAULT_MAX_RECURSION: usize = 100;

/// Options read by discovery strategies
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerOptions {
    /// Highest iteration index the recursive strategy may run
    ///
    /// Iterations are numbered from 0, so a cap of `n` allows `n + 1`
    /// non-empty batches before the run aborts.
    pub max_recursion: usize,
}

impl TriggerOptions {
    pub fn new(max_recursion: usize) -> Self {
        Self { max_recursion }
    }

    pub fn with_max_recursion(mut self, max_recursion: usize) -> Self {
        self.max_recursion = max_recursion;
        self
    }
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            max_recursion: DEFAULT_MAX_RECURSION,
        }
    }
}

/// Logging section of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub profile: Profile,
}

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub triggers: TriggerOptions,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parse settings from a TOML document
    ///
    /// Missing sections and keys fall back to their defaults; unknown keys
    /// are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TriggerError::Io {
            message: format!("Failed to read settings file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        assert_eq!(TriggerOptions::default().max_recursion, DEFAULT_MAX_RECURSION);
        assert_eq!(TriggerOptions::new(3).with_max_recursion(5).max_recursion, 5);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_full_document() {
        let settings = Settings::from_toml_str(
            r#"
            [triggers]
            max_recursion = 7

            [logging]
            profile = "production"
            "#,
        )
        .unwrap();

        assert_eq!(settings.triggers.max_recursion, 7);
        assert_eq!(settings.logging.profile, Profile::Production);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Settings::from_toml_str("[triggers]\nmax_recursions = 1\n").unwrap_err();
        assert!(matches!(err, TriggerError::Serialization { .. }));
    }

    #[test]
    fn test_negative_recursion_rejected() {
        let err = Settings::from_toml_str("[triggers]\nmax_recursion = -1\n").unwrap_err();
        assert!(matches!(err, TriggerError::Serialization { .. }));
    }
}
