//! Runtime configuration
//!
//! Defaults reproduce the text layout of the demonstration scenarios. Every
//! section can be overridden from TOML:
//!
//! ```toml
//! [composite]
//! header = "Group:"
//! separator = " | "
//!
//! [cache]
//! key_separator = "/"
//! max_entries = 128
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Composite aggregation layout
    pub composite: CompositeConfig,
    /// Shared instance cache settings
    pub cache: CacheConfig,
}

impl RuntimeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With composite layout
    #[inline]
    #[must_use]
    pub fn with_composite(mut self, composite: CompositeConfig) -> Self {
        self.composite = composite;
        self
    }

    /// With cache settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.key_separator.is_empty() {
            return Err(ConfigError::Invalid(
                "cache.key_separator must not be empty".to_string(),
            ));
        }
        if self.cache.max_entries == Some(0) {
            return Err(ConfigError::Invalid(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Composite aggregation layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// First line of every aggregate, empty or not
    pub header: String,
    /// Joins child outcomes
    pub separator: String,
}

impl CompositeConfig {
    /// With header
    #[inline]
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// With separator
    #[inline]
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            header: "Composite:".to_string(),
            separator: "\n".to_string(),
        }
    }
}

/// Shared instance cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Joins key parts when a key is displayed
    pub key_separator: String,
    /// Accept empty or whitespace-only key segments
    pub allow_empty_segments: bool,
    /// Registry size limit; `None` means unbounded
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    /// With registry size limit
    #[inline]
    #[must_use]
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Accept empty key segments
    #[inline]
    #[must_use]
    pub fn allowing_empty_segments(mut self) -> Self {
        self.allow_empty_segments = true;
        self
    }

    /// With key separator
    #[inline]
    #[must_use]
    pub fn with_key_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_separator = separator.into();
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_separator: "-".to_string(),
            allow_empty_segments: false,
            max_entries: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_demo_layout() {
        let config = RuntimeConfig::new();
        assert_eq!(config.composite.header, "Composite:");
        assert_eq!(config.composite.separator, "\n");
        assert_eq!(config.cache.key_separator, "-");
        assert!(!config.cache.allow_empty_segments);
        assert!(config.cache.max_entries.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [cache]
            max_entries = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.max_entries, Some(4));
        assert_eq!(config.cache.key_separator, "-");
        assert_eq!(config.composite, CompositeConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn rejects_empty_key_separator() {
        let err = RuntimeConfig::from_toml_str(
            r#"
            [cache]
            key_separator = ""
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = RuntimeConfig::new().with_cache(CacheConfig::default().with_max_entries(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = RuntimeConfig::from_toml_str("[cache\nmax_entries = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[composite]\nheader = \"Group:\"\nseparator = \" | \"").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.composite.header, "Group:");
        assert_eq!(config.composite.separator, " | ");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = RuntimeConfig::load("/nonexistent/runtime.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builders_chain() {
        let config = RuntimeConfig::new()
            .with_composite(CompositeConfig::default().with_header("Tree:").with_separator(", "))
            .with_cache(
                CacheConfig::default()
                    .with_key_separator("/")
                    .allowing_empty_segments(),
            );

        assert_eq!(config.composite.header, "Tree:");
        assert_eq!(config.cache.key_separator, "/");
        assert!(config.cache.allow_empty_segments);
    }
}
