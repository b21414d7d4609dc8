//! Error types for trackforge

use thiserror::Error;

/// Main error type for trackforge operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Malformed logic or dungeon authoring
    #[error("Configuration error: {0}")]
    Config(String),

    /// `min`/`max` reduction over an empty set of levels
    #[error("Cannot reduce an empty set of accessibility levels")]
    EmptyLevels,

    /// A requirement id that does not belong to this graph
    #[error("Unknown requirement: {0}")]
    UnknownRequirement(u32),

    /// A node id that does not belong to this graph
    #[error("Unknown node: {0}")]
    UnknownNode(u32),

    /// A dungeon that was never registered
    #[error("Unknown dungeon: {0}")]
    UnknownDungeon(u32),

    /// The logic graph or a dungeon layout contains a cycle
    #[error("Cycle detected: {0}")]
    Cycle(String),

    /// Key-layout enumeration produced no candidates
    #[error("Dungeon {0} produced an empty key layout space")]
    EmptyLayoutSpace(String),

    /// The search was superseded by a newer state change
    #[error("Search was superseded by a newer state change")]
    Superseded,

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns true for authoring errors that must abort the triggering operation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TrackerError::Config(_)
                | TrackerError::EmptyLevels
                | TrackerError::UnknownRequirement(_)
                | TrackerError::UnknownNode(_)
                | TrackerError::UnknownDungeon(_)
                | TrackerError::Cycle(_)
                | TrackerError::EmptyLayoutSpace(_)
        )
    }
}

/// Result type alias for trackforge operations
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(TrackerError::EmptyLevels.is_configuration());
        assert!(TrackerError::Cycle("a -> a".into()).is_configuration());
        assert!(!TrackerError::Superseded.is_configuration());
        assert!(!TrackerError::Internal("x".into()).is_configuration());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TrackerError::UnknownRequirement(7).to_string(),
            "Unknown requirement: 7"
        );
        assert_eq!(
            TrackerError::EmptyLayoutSpace("Tower".into()).to_string(),
            "Dungeon Tower produced an empty key layout space"
        );
    }
}
