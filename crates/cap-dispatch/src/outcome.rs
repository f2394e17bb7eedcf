//! Dispatch outcome

use serde::{Deserialize, Serialize};

/// Result of sending a request down a chain
///
/// `Unhandled` is an ordinary outcome meant for display, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dispatch<Out> {
    /// A handler accepted the request
    Handled {
        /// Name of the accepting handler
        by: String,
        /// Its canned outcome
        outcome: Out,
    },
    /// No handler on the chain accepted the request
    Unhandled,
}

impl<Out> Dispatch<Out> {
    /// Whether some handler accepted the request
    #[inline]
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// Outcome, if handled
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> Option<&Out> {
        match self {
            Self::Handled { outcome, .. } => Some(outcome),
            Self::Unhandled => None,
        }
    }

    /// Name of the accepting handler, if handled
    #[inline]
    #[must_use]
    pub fn handled_by(&self) -> Option<&str> {
        match self {
            Self::Handled { by, .. } => Some(by),
            Self::Unhandled => None,
        }
    }

    /// Consume into the outcome, if handled
    #[inline]
    #[must_use]
    pub fn into_option(self) -> Option<Out> {
        match self {
            Self::Handled { outcome, .. } => Some(outcome),
            Self::Unhandled => None,
        }
    }
}
