use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use triggered_core::discovery::{DiscoveryLog, Iteration};
use triggered_core::{ChangeBatch, ChangeTracker, Result, TriggerError};

/// Tracker that replays scripted comparison results
///
/// Each `discover_changes` call pops the next scripted batch (empty once the
/// script runs out), or in endless mode invents one new entity per call.
/// Counts how often each tracker operation is used.
#[allow(dead_code)]
pub struct ScriptedTracker {
    responses: VecDeque<Vec<String>>,
    endless: bool,
    discovered: Option<Vec<String>>,
    pub fresh_calls: usize,
    discovered_calls: Cell<usize>,
}

#[allow(dead_code)]
impl ScriptedTracker {
    /// A tracker on which no discovery has run yet
    pub fn new(responses: Vec<Vec<&str>>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|batch| batch.into_iter().map(str::to_string).collect())
                .collect(),
            endless: false,
            discovered: None,
            fresh_calls: 0,
            discovered_calls: Cell::new(0),
        }
    }

    /// A tracker whose earlier, independent discovery found `already`
    pub fn with_discovered(already: Vec<&str>, responses: Vec<Vec<&str>>) -> Self {
        let mut tracker = Self::new(responses);
        tracker.discovered = Some(already.into_iter().map(str::to_string).collect());
        tracker
    }

    /// A tracker whose every comparison finds one entity never seen before
    pub fn endless() -> Self {
        let mut tracker = Self::with_discovered(Vec::new(), Vec::new());
        tracker.endless = true;
        tracker
    }

    pub fn discovered_calls(&self) -> usize {
        self.discovered_calls.get()
    }
}

impl ChangeTracker for ScriptedTracker {
    type Descriptor = String;

    fn has_discovered_changes(&self) -> bool {
        self.discovered.is_some()
    }

    fn discovered_changes(&self) -> Result<ChangeBatch<String>> {
        self.discovered_calls.set(self.discovered_calls.get() + 1);
        self.discovered
            .clone()
            .map(ChangeBatch::from)
            .ok_or(TriggerError::DiscoveryNotStarted)
    }

    fn discover_changes(&mut self) -> ChangeBatch<String> {
        self.fresh_calls += 1;
        let batch = if self.endless {
            vec![format!("generated-{}", self.fresh_calls)]
        } else {
            self.responses.pop_front().unwrap_or_default()
        };
        self.discovered
            .get_or_insert_with(Vec::new)
            .extend(batch.iter().cloned());
        ChangeBatch::from(batch)
    }
}

/// One call recorded by [`RecordingLog`]
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Started {
        name: String,
        max_recursion: usize,
    },
    Detected {
        name: String,
        changes: usize,
        iteration: Option<Iteration>,
    },
    Completed {
        name: String,
        iterations: usize,
    },
}

/// Discovery log that keeps every call in memory
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingLog {
    records: Mutex<Vec<LogRecord>>,
}

#[allow(dead_code)]
impl RecordingLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(&self, record: LogRecord) {
        self.records.lock().map(|mut r| r.push(record)).ok();
    }
}

impl DiscoveryLog for RecordingLog {
    fn discovery_started(&self, name: &str, max_recursion: usize) {
        self.push(LogRecord::Started {
            name: name.to_string(),
            max_recursion,
        });
    }

    fn changes_detected(&self, name: &str, changes: usize, iteration: Option<Iteration>) {
        self.push(LogRecord::Detected {
            name: name.to_string(),
            changes,
            iteration,
        });
    }

    fn discovery_completed(&self, name: &str, iterations: usize) {
        self.push(LogRecord::Completed {
            name: name.to_string(),
            iterations,
        });
    }
}

/// Convert string literals into owned descriptors for comparisons
#[allow(dead_code)]
pub fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
