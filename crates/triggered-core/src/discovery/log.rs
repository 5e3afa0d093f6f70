//! Observability sink for discovery strategies
//!
//! Strategies report what they found through [`DiscoveryLog`]; nothing here
//! feeds back into control flow, so [`NoopDiscoveryLog`] can replace
//! [`TracingDiscoveryLog`] without changing what a run yields.

use triggered_core_types::schema::{
    EVENT_CHANGES_DETECTED, EVENT_DISCOVERY_COMPLETED, EVENT_DISCOVERY_STARTED,
};

const OP_DISCOVER: &str = "discover";

/// Position of a recursive iteration relative to its cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    pub index: usize,
    pub max_recursion: usize,
}

pub trait DiscoveryLog: Send + Sync {
    /// A recursive run is starting
    fn discovery_started(&self, name: &str, max_recursion: usize);

    /// A non-empty batch (or the single-pass batch) is about to be yielded
    ///
    /// `iteration` is `None` for single-pass discovery.
    fn changes_detected(&self, name: &str, changes: usize, iteration: Option<Iteration>);

    /// A recursive run reached an empty batch after `iterations` non-empty ones
    fn discovery_completed(&self, name: &str, iterations: usize);
}

/// Emits discovery records as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiscoveryLog;

impl DiscoveryLog for TracingDiscoveryLog {
    fn discovery_started(&self, name: &str, max_recursion: usize) {
        tracing::debug!(
            component = module_path!(),
            op = OP_DISCOVER,
            event = EVENT_DISCOVERY_STARTED,
            name,
            max_recursion,
            "Starting trigger discovery for {} with a max recursion of {}",
            name,
            max_recursion
        );
    }

    fn changes_detected(&self, name: &str, changes: usize, iteration: Option<Iteration>) {
        match iteration {
            Some(Iteration {
                index,
                max_recursion,
            }) => tracing::info!(
                component = module_path!(),
                op = OP_DISCOVER,
                event = EVENT_CHANGES_DETECTED,
                name,
                changes,
                iteration = index,
                max_recursion,
                "Discovered changes: {} for {}. Iteration ({}/{})",
                changes,
                name,
                index,
                max_recursion
            ),
            None => tracing::info!(
                component = module_path!(),
                op = OP_DISCOVER,
                event = EVENT_CHANGES_DETECTED,
                name,
                changes,
                "Discovered changes: {} for {}",
                changes,
                name
            ),
        }
    }

    fn discovery_completed(&self, name: &str, iterations: usize) {
        tracing::debug!(
            component = module_path!(),
            op = OP_DISCOVER,
            event = EVENT_DISCOVERY_COMPLETED,
            name,
            iterations,
            "Trigger discovery for {} settled after {} iterations",
            name,
            iterations
        );
    }
}

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiscoveryLog;

impl DiscoveryLog for NoopDiscoveryLog {
    fn discovery_started(&self, _: &str, _: usize) {}

    fn changes_detected(&self, _: &str, _: usize, _: Option<Iteration>) {}

    fn discovery_completed(&self, _: &str, _: usize) {}
}
