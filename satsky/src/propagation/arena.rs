//! Catalog-wide parallel state dispatch.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{error, info, warn};

use super::error::PropagationError;
use super::propagator::{Propagator, StateLayout};
use crate::elements::ElementRecord;

/// Positional arena of per-object propagator states.
///
/// Slot `i` belongs to catalog record `i`. Built once per catalog load and
/// read-only afterwards.
#[derive(Debug)]
pub struct StateArena<S> {
    states: Vec<S>,
    layout: StateLayout,
}

impl<S> StateArena<S> {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.states.get(index)
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Layout reported by the capability probe.
    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    /// Total bytes held by state slots.
    pub fn footprint_bytes(&self) -> usize {
        self.layout.stride * self.states.len()
    }
}

/// Probes the propagator, then initializes every record in parallel.
///
/// # Errors
///
/// Returns [`PropagationError::Capacity`] if the probe fails. If any record
/// fails to initialize, every failure is logged and the one with the lowest
/// index is returned as [`PropagationError::Dispatch`].
pub fn dispatch_states<P: Propagator>(
    propagator: &P,
    records: &[ElementRecord],
) -> Result<StateArena<P::State>, PropagationError> {
    let layout = propagator.probe()?;
    let started = Instant::now();

    let results: Vec<Result<P::State, PropagationError>> = records
        .par_iter()
        .map(|record| propagator.initialize(record))
        .collect();

    let mut states = Vec::with_capacity(records.len());
    let mut first_failure = None;
    let mut failures = 0usize;
    for (index, (record, result)) in records.iter().zip(results).enumerate() {
        match result {
            Ok(state) => states.push(state),
            Err(e) => {
                failures += 1;
                warn!(
                    index,
                    catalog_id = %record.catalog_id,
                    error = %e,
                    "Failed to initialize propagator state"
                );
                first_failure.get_or_insert(PropagationError::Dispatch {
                    index,
                    catalog_id: record.catalog_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if let Some(err) = first_failure {
        error!(failures, objects = records.len(), "State dispatch failed");
        return Err(err);
    }

    info!(
        propagator = propagator.name(),
        objects = states.len(),
        stride = layout.stride,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dispatched propagator states"
    );
    Ok(StateArena { states, layout })
}
