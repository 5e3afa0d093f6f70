//! Single-pass discovery
//!
//! Hands over whatever the tracker has already discovered, as one batch,
//! without running a new comparison. Suited to checkpoints that must not
//! react to their own side effects, such as after-save triggers.

use std::sync::Arc;

use super::{DiscoveryCursor, DiscoveryLog, DiscoveryStrategy};
use crate::config::TriggerOptions;
use crate::errors::{Result, TriggerError};
use crate::tracker::{ChangeBatch, ChangeTracker};

#[derive(Debug, Clone)]
pub struct NonRecursiveDiscoveryStrategy {
    name: String,
}

impl NonRecursiveDiscoveryStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<T: ChangeTracker> DiscoveryStrategy<T> for NonRecursiveDiscoveryStrategy {
    type Cursor = SinglePassCursor<T::Descriptor>;

    fn name(&self) -> &str {
        &self.name
    }

    fn discover(
        &self,
        _options: &TriggerOptions,
        tracker: &T,
        log: Arc<dyn DiscoveryLog>,
    ) -> Result<Self::Cursor> {
        if !tracker.has_discovered_changes() {
            return Err(TriggerError::DiscoveryNotStarted);
        }
        let changes = tracker.discovered_changes()?;

        log.changes_detected(&self.name, changes.len(), None);

        Ok(SinglePassCursor {
            batch: Some(changes),
        })
    }
}

/// Yields its one batch, empty or not, then ends
#[derive(Debug)]
pub struct SinglePassCursor<D> {
    batch: Option<ChangeBatch<D>>,
}

impl<T: ChangeTracker> DiscoveryCursor<T> for SinglePassCursor<T::Descriptor> {
    fn next_batch(&mut self, _tracker: &mut T) -> Option<Result<ChangeBatch<T::Descriptor>>> {
        self.batch.take().map(Ok)
    }
}
