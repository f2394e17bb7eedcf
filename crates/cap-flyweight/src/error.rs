//! Error types for the shared instance cache

/// Errors while resolving a shared instance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Key has no parts at all
    #[error("cache key has no parts")]
    EmptyKey,

    /// A key part is empty or whitespace-only
    #[error("cache key part {index} is empty")]
    EmptySegment {
        /// Position of the offending part
        index: usize,
    },

    /// Registry is full and the key is not yet present
    #[error("cache capacity exceeded ({max} entries)")]
    CapacityExceeded {
        /// Configured limit
        max: usize,
    },

    /// Instance builder refused the key
    #[error("failed to build instance for '{key}': {message}")]
    Build {
        /// Rendered key
        key: String,
        /// Builder's reason
        message: String,
    },
}

impl CacheError {
    /// Create build error for key
    pub fn build(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Build {
            key: key.into(),
            message: message.into(),
        }
    }
}
