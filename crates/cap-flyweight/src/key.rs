//! Cache keys built from intrinsic attributes

use crate::error::CacheError;
use cap_core::CacheConfig;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Ordered intrinsic parts identifying one canonical instance
///
/// Equality is part-wise, so `["a-b", "c"]` and `["a", "b-c"]` are distinct
/// keys even though they render identically.
///
/// Deserialization rejects a key with no parts. Whether blank parts are
/// acceptable depends on the cache's [`CacheConfig`], so the factory checks
/// that again when the key is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    parts: Vec<String>,
}

impl<'de> Deserialize<'de> for CacheKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            parts: Vec<String>,
        }

        let key = Self {
            parts: Raw::deserialize(deserializer)?.parts,
        };
        key.validate(&CacheConfig::default().allowing_empty_segments())
            .map_err(de::Error::custom)?;
        Ok(key)
    }
}

impl CacheKey {
    /// Build a key, validating parts per `config`
    ///
    /// # Errors
    /// - [`CacheError::EmptyKey`] when there are no parts
    /// - [`CacheError::EmptySegment`] for a blank part, unless
    ///   `config.allow_empty_segments` is set
    pub fn new<I, S>(parts: I, config: &CacheConfig) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = Self {
            parts: parts.into_iter().map(Into::into).collect(),
        };
        key.validate(config)?;
        Ok(key)
    }

    /// Check this key against `config`
    ///
    /// # Errors
    /// Same as [`CacheKey::new`].
    pub fn validate(&self, config: &CacheConfig) -> Result<(), CacheError> {
        if self.parts.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        if !config.allow_empty_segments {
            if let Some(index) = self.parts.iter().position(|p| p.trim().is_empty()) {
                return Err(CacheError::EmptySegment { index });
            }
        }
        Ok(())
    }

    /// All parts in order
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Part at `index`
    #[inline]
    #[must_use]
    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    /// Number of parts
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parts.len()
    }

    /// Render with a custom separator
    #[must_use]
    pub fn joined(&self, separator: &str) -> String {
        self.parts.join(separator)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined("-"))
    }
}
