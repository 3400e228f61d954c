//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They
//! are distinct from feed loading and pricing errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid ride construction (e.g., alight before board)
    #[error("invalid ride: {0}")]
    InvalidRide(&'static str),

    /// Itinerary has no rides
    #[error("itinerary must have at least one ride")]
    EmptyItinerary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidRide("alight time must not precede board time");
        assert_eq!(
            err.to_string(),
            "invalid ride: alight time must not precede board time"
        );

        let err = DomainError::EmptyItinerary;
        assert_eq!(err.to_string(), "itinerary must have at least one ride");
    }
}
