//! Error types for tree and wrapper construction

/// Structural construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// Adding the child would make a node its own descendant
    #[error("adding '{child}' to '{parent}' would create a cycle")]
    CycleDetected {
        /// Composite being extended
        parent: String,
        /// Rejected child
        child: String,
    },
}
