//! Trigger session
//!
//! Owns a change tracker for the lifetime of one unit of work and raises
//! triggers for it. Before-save triggers use recursive discovery, so a
//! trigger that changes further entities gets those changes dispatched too.
//! After-save triggers use single-pass discovery over what was already found.

use std::sync::Arc;
use std::time::Instant;

use triggered_core_types::SessionId;

use crate::config::TriggerOptions;
use crate::discovery::{
    DiscoveryCursor, DiscoveryLog, DiscoveryStrategy, NonRecursiveDiscoveryStrategy,
    RecursiveDiscoveryStrategy, TracingDiscoveryLog,
};
use crate::errors::Result;
use crate::tracker::ChangeTracker;
use crate::{log_op_end, log_op_error, log_op_start};

/// Checkpoint a trigger is raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPhase {
    BeforeSave,
    AfterSave,
}

impl TriggerPhase {
    /// Name given to the discovery strategy for this phase
    pub fn strategy_name(&self) -> &'static str {
        match self {
            TriggerPhase::BeforeSave => "BeforeSave",
            TriggerPhase::AfterSave => "AfterSave",
        }
    }

    fn op(&self) -> &'static str {
        match self {
            TriggerPhase::BeforeSave => "raise_before_save_triggers",
            TriggerPhase::AfterSave => "raise_after_save_triggers",
        }
    }
}

/// Invokes user reactions for discovered changes
///
/// The tracker is lent to the dispatcher so reactions can change further
/// entities; during before-save dispatch those changes are picked up by the
/// next discovery iteration.
pub trait TriggerDispatcher<T: ChangeTracker> {
    /// # Errors
    ///
    /// Any error aborts the raise and is returned to its caller.
    fn dispatch(
        &mut self,
        phase: TriggerPhase,
        change: &T::Descriptor,
        tracker: &mut T,
    ) -> Result<()>;
}

pub struct TriggerSession<T: ChangeTracker> {
    tracker: T,
    options: TriggerOptions,
    log: Arc<dyn DiscoveryLog>,
    session_id: SessionId,
}

impl<T: ChangeTracker> TriggerSession<T> {
    /// Create a session reporting discovery through `tracing`
    pub fn new(tracker: T, options: TriggerOptions) -> Self {
        Self {
            tracker,
            options,
            log: Arc::new(TracingDiscoveryLog),
            session_id: SessionId::new(),
        }
    }

    /// Replace the discovery log
    pub fn with_log(mut self, log: Arc<dyn DiscoveryLog>) -> Self {
        self.log = log;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn options(&self) -> &TriggerOptions {
        &self.options
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    pub fn into_tracker(self) -> T {
        self.tracker
    }

    /// Run one comparison now, returning the number of new changes
    ///
    /// Changes found here are included in the first batch of a following
    /// `raise_before_save_triggers(.., false)`.
    pub fn discover_changes(&mut self) -> usize {
        let changes = self.tracker.discover_changes().len();
        tracing::debug!(
            session_id = self.session_id.as_str(),
            changes,
            "discovered changes ahead of trigger dispatch"
        );
        changes
    }

    /// Dispatch before-save triggers until no trigger causes further changes
    ///
    /// With `skip_detected_changes` false, the first batch also holds what an
    /// earlier `discover_changes` found. Returns the number of changes
    /// dispatched.
    ///
    /// # Errors
    ///
    /// - `MaxRecursionReached` if triggers keep causing changes past the cap
    /// - any error returned by the dispatcher
    pub fn raise_before_save_triggers<D>(
        &mut self,
        dispatcher: &mut D,
        skip_detected_changes: bool,
    ) -> Result<usize>
    where
        D: TriggerDispatcher<T>,
    {
        let strategy = RecursiveDiscoveryStrategy::new(
            TriggerPhase::BeforeSave.strategy_name(),
            skip_detected_changes,
        );
        self.raise(TriggerPhase::BeforeSave, &strategy, dispatcher)
    }

    /// Dispatch after-save triggers for every change discovered so far
    ///
    /// # Errors
    ///
    /// - `DiscoveryNotStarted` if nothing was discovered beforehand
    /// - any error returned by the dispatcher
    pub fn raise_after_save_triggers<D>(&mut self, dispatcher: &mut D) -> Result<usize>
    where
        D: TriggerDispatcher<T>,
    {
        let strategy = NonRecursiveDiscoveryStrategy::new(TriggerPhase::AfterSave.strategy_name());
        self.raise(TriggerPhase::AfterSave, &strategy, dispatcher)
    }

    fn raise<S, D>(&mut self, phase: TriggerPhase, strategy: &S, dispatcher: &mut D) -> Result<usize>
    where
        S: DiscoveryStrategy<T>,
        D: TriggerDispatcher<T>,
    {
        let op = phase.op();
        let started = Instant::now();
        log_op_start!(op, session_id = self.session_id.as_str());

        let result = self.dispatch_all(phase, strategy, dispatcher);

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(dispatched) => {
                log_op_end!(
                    op,
                    duration_ms = duration_ms,
                    session_id = self.session_id.as_str(),
                    dispatched = *dispatched
                );
            }
            Err(err) => {
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = duration_ms,
                    session_id = self.session_id.as_str()
                );
            }
        }

        result
    }

    fn dispatch_all<S, D>(
        &mut self,
        phase: TriggerPhase,
        strategy: &S,
        dispatcher: &mut D,
    ) -> Result<usize>
    where
        S: DiscoveryStrategy<T>,
        D: TriggerDispatcher<T>,
    {
        let mut cursor = strategy.discover(&self.options, &self.tracker, self.log.clone())?;
        let mut dispatched = 0;

        while let Some(batch) = cursor.next_batch(&mut self.tracker) {
            for change in batch? {
                dispatcher.dispatch(phase, &change, &mut self.tracker)?;
                dispatched += 1;
            }
        }

        Ok(dispatched)
    }
}
