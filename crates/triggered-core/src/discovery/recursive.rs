//! Recursive discovery
//!
//! Asks the tracker for new changes once per pull until a comparison comes
//! back empty. Triggers dispatched for batch `i` run before batch `i + 1` is
//! computed, so later iterations see the changes those triggers made.
//!
//! A trigger graph that never settles (A changes what B watches and B changes
//! what A watches) would loop forever; the run aborts with
//! `TriggerError::MaxRecursionReached` once the iteration index passes
//! `TriggerOptions::max_recursion`.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::{DiscoveryCursor, DiscoveryLog, DiscoveryStrategy, Iteration};
use crate::config::TriggerOptions;
use crate::errors::{Result, TriggerError};
use crate::tracker::{ChangeBatch, ChangeTracker};

#[derive(Debug, Clone)]
pub struct RecursiveDiscoveryStrategy {
    name: String,
    skip_detected_changes: bool,
}

impl RecursiveDiscoveryStrategy {
    /// `skip_detected_changes = false` makes the first batch include changes
    /// the caller discovered before starting the run.
    pub fn new(name: impl Into<String>, skip_detected_changes: bool) -> Self {
        Self {
            name: name.into(),
            skip_detected_changes,
        }
    }

    pub fn skip_detected_changes(&self) -> bool {
        self.skip_detected_changes
    }
}

impl<T: ChangeTracker> DiscoveryStrategy<T> for RecursiveDiscoveryStrategy {
    type Cursor = RecursiveCursor<T::Descriptor>;

    fn name(&self) -> &str {
        &self.name
    }

    fn discover(
        &self,
        options: &TriggerOptions,
        _tracker: &T,
        log: Arc<dyn DiscoveryLog>,
    ) -> Result<Self::Cursor> {
        log.discovery_started(&self.name, options.max_recursion);

        Ok(RecursiveCursor {
            name: self.name.clone(),
            max_recursion: options.max_recursion,
            skip_detected_changes: self.skip_detected_changes,
            log,
            state: CursorState::Iterating { iteration: 0 },
            delivered: HashSet::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Iterating { iteration: usize },
    Terminated { iterations: usize },
    Aborted { iterations: usize },
}

/// Cursor of one recursive run
pub struct RecursiveCursor<D> {
    name: String,
    max_recursion: usize,
    skip_detected_changes: bool,
    log: Arc<dyn DiscoveryLog>,
    state: CursorState,
    delivered: HashSet<D>,
}

impl<D> RecursiveCursor<D> {
    /// True once the run settled or aborted
    pub fn is_finished(&self) -> bool {
        !matches!(self.state, CursorState::Iterating { .. })
    }

    /// True if the run ended by exceeding the recursion cap
    pub fn is_aborted(&self) -> bool {
        matches!(self.state, CursorState::Aborted { .. })
    }

    /// Number of iterations that found changes, including ones whose
    /// changes had all been yielded already
    pub fn iterations(&self) -> usize {
        match self.state {
            CursorState::Iterating { iteration } => iteration,
            CursorState::Terminated { iterations } | CursorState::Aborted { iterations } => {
                iterations
            }
        }
    }
}

impl<D> fmt::Debug for RecursiveCursor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveCursor")
            .field("name", &self.name)
            .field("max_recursion", &self.max_recursion)
            .field("skip_detected_changes", &self.skip_detected_changes)
            .field("state", &self.state)
            .field("delivered", &self.delivered.len())
            .finish()
    }
}

impl<T: ChangeTracker> DiscoveryCursor<T> for RecursiveCursor<T::Descriptor> {
    fn next_batch(&mut self, tracker: &mut T) -> Option<Result<ChangeBatch<T::Descriptor>>> {
        loop {
            let iteration = match self.state {
                CursorState::Iterating { iteration } => iteration,
                CursorState::Terminated { .. } | CursorState::Aborted { .. } => return None,
            };

            if iteration > self.max_recursion {
                self.state = CursorState::Aborted {
                    iterations: iteration,
                };
                return Some(Err(TriggerError::MaxRecursionReached {
                    name: self.name.clone(),
                    max_recursion: self.max_recursion,
                    iteration,
                }));
            }

            let fresh = tracker.discover_changes();

            // The scan above marks discovery as started, so the cumulative set
            // holds any earlier discovery plus what the scan just found
            let candidates = if iteration == 0 && !self.skip_detected_changes {
                match tracker.discovered_changes() {
                    Ok(changes) => changes,
                    Err(err) => {
                        self.state = CursorState::Aborted {
                            iterations: iteration,
                        };
                        return Some(Err(err));
                    }
                }
            } else {
                fresh
            };

            if candidates.is_empty() {
                self.state = CursorState::Terminated {
                    iterations: iteration,
                };
                self.log.discovery_completed(&self.name, iteration);
                return None;
            }

            self.state = CursorState::Iterating {
                iteration: iteration + 1,
            };

            // Changes already yielded in this run still count towards the cap
            let batch: ChangeBatch<_> = candidates
                .into_iter()
                .filter(|change| self.delivered.insert(change.clone()))
                .collect();
            if batch.is_empty() {
                continue;
            }

            self.log.changes_detected(
                &self.name,
                batch.len(),
                Some(Iteration {
                    index: iteration,
                    max_recursion: self.max_recursion,
                }),
            );

            return Some(Ok(batch));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::NoopDiscoveryLog;
    use crate::tracker::TriggerContextTracker;

    fn start(
        tracker: &TriggerContextTracker<u32, u32>,
        max_recursion: usize,
        skip: bool,
    ) -> RecursiveCursor<<TriggerContextTracker<u32, u32> as ChangeTracker>::Descriptor> {
        RecursiveDiscoveryStrategy::new("Recursive", skip)
            .discover(
                &TriggerOptions::new(max_recursion),
                tracker,
                Arc::new(NoopDiscoveryLog),
            )
            .unwrap()
    }

    #[test]
    fn test_settles_on_empty_comparison() {
        let mut tracker = TriggerContextTracker::new();
        tracker.upsert(1, 1);

        let mut cursor = start(&tracker, 5, true);
        assert_eq!(cursor.next_batch(&mut tracker).unwrap().unwrap().len(), 1);
        assert!(!cursor.is_finished());

        assert!(cursor.next_batch(&mut tracker).is_none());
        assert!(cursor.is_finished());
        assert!(!cursor.is_aborted());
        assert_eq!(cursor.iterations(), 1);

        // Finished cursors stay finished even if the tracker changes again
        tracker.upsert(2, 2);
        assert!(cursor.next_batch(&mut tracker).is_none());
    }

    #[test]
    fn test_aborts_past_cap_and_stays_aborted() {
        let mut tracker = TriggerContextTracker::new();
        tracker.upsert(1, 1);

        let mut cursor = start(&tracker, 0, true);
        assert!(cursor.next_batch(&mut tracker).unwrap().is_ok());

        tracker.upsert(2, 2);
        let err = cursor.next_batch(&mut tracker).unwrap().unwrap_err();
        assert_eq!(
            err,
            TriggerError::MaxRecursionReached {
                name: "Recursive".to_string(),
                max_recursion: 0,
                iteration: 1,
            }
        );
        assert!(cursor.is_aborted());
        assert!(cursor.next_batch(&mut tracker).is_none());
    }

    #[test]
    fn test_first_iteration_starts_discovery_on_fresh_tracker() {
        let mut tracker = TriggerContextTracker::new();
        tracker.attach(1, 1);
        tracker.upsert(1, 2);
        assert!(!tracker.has_discovered_changes());

        let mut cursor = start(&tracker, 5, false);
        assert_eq!(cursor.next_batch(&mut tracker).unwrap().unwrap().len(), 1);
        assert!(tracker.has_discovered_changes());
        assert!(cursor.next_batch(&mut tracker).is_none());
    }
}
