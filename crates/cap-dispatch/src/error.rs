//! Error types for chain construction

/// Dispatch chain construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Linking would let a request travel back to a handler it already passed
    #[error("linking '{from}' -> '{to}' would create a cycle")]
    CycleDetected {
        /// Handler whose link was being set
        from: String,
        /// Rejected successor
        to: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display() {
        let err = DispatchError::CycleDetected {
            from: "Dog".to_string(),
            to: "Monkey".to_string(),
        };
        assert_eq!(err.to_string(), "linking 'Dog' -> 'Monkey' would create a cycle");
    }
}
