//! Error types for propagator dispatch and queries.

use thiserror::Error;

/// Errors from the propagator or its dispatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    /// The capability probe failed or reported an unusable state layout.
    #[error("Propagator capability probe failed: {0}")]
    Capacity(String),

    /// One record could not be turned into propagator state.
    #[error("Cannot initialize propagator for {catalog_id}: {reason}")]
    Initialization { catalog_id: String, reason: String },

    /// Catalog-wide dispatch failed at the given arena index.
    #[error("State dispatch failed at object {index} ({catalog_id}): {reason}")]
    Dispatch {
        index: usize,
        catalog_id: String,
        reason: String,
    },

    /// Propagation to a specific time failed (e.g. the orbit has decayed).
    #[error("Propagation to {minutes:.3} min from epoch failed: {reason}")]
    Propagation { minutes: f64, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_display() {
        let err = PropagationError::Dispatch {
            index: 4,
            catalog_id: "25544".to_string(),
            reason: "eccentricity out of range".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "State dispatch failed at object 4 (25544): eccentricity out of range"
        );
    }
}
