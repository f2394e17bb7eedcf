//! Error types for the demonstration scenarios

use crate::scenarios::Scenario;
use cap_dispatch::DispatchError;
use cap_flyweight::CacheError;
use cap_structure::StructureError;

/// Errors while running or rendering a scenario
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Composite scenario could not build its tree
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Chain scenario could not link its handlers
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Flyweight scenario could not resolve a shared instance
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Report could not be converted to JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A composite selector was used where one section was expected
    #[error("'{0:?}' is not a single scenario")]
    NotSingle(Scenario),
}
