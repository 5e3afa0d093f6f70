//! Change discovery engine
//!
//! A [`DiscoveryStrategy`] decides how many times the tracker is asked for
//! changes and how the results are grouped. Calling
//! [`discover`](DiscoveryStrategy::discover) checks preconditions and returns
//! a [`DiscoveryCursor`]; no tracker comparison happens until the cursor is
//! pulled.
//!
//! The cursor borrows the tracker only for the duration of one pull, so a
//! dispatcher may mutate the tracked entities between pulls. That is what lets
//! the recursive strategy observe changes caused by triggers fired for an
//! earlier batch.
//!
//! ```
//! use std::sync::Arc;
//! use triggered_core::discovery::{Discovery, NoopDiscoveryLog, RecursiveDiscoveryStrategy};
//! use triggered_core::tracker::TriggerContextTracker;
//! use triggered_core::TriggerOptions;
//!
//! let mut tracker = TriggerContextTracker::new();
//! tracker.attach(1u32, "draft");
//! tracker.upsert(1, "published");
//!
//! let strategy = RecursiveDiscoveryStrategy::new("BeforeSave", true);
//! let changes: Vec<_> = Discovery::start(
//!     &strategy,
//!     &TriggerOptions::default(),
//!     &mut tracker,
//!     Arc::new(NoopDiscoveryLog),
//! )?
//! .changes()
//! .collect::<Result<_, _>>()?;
//!
//! assert_eq!(changes.len(), 1);
//! # Ok::<(), triggered_core::TriggerError>(())
//! ```

pub mod log;
pub mod non_recursive;
pub mod recursive;

use std::sync::Arc;

use crate::config::TriggerOptions;
use crate::errors::Result;
use crate::tracker::{ChangeBatch, ChangeTracker};

pub use log::{DiscoveryLog, Iteration, NoopDiscoveryLog, TracingDiscoveryLog};
pub use non_recursive::{NonRecursiveDiscoveryStrategy, SinglePassCursor};
pub use recursive::{RecursiveCursor, RecursiveDiscoveryStrategy};

/// Pull side of a discovery run
///
/// Each call runs at most one discovery iteration. `None` means the run is
/// over; after an `Err` the cursor only returns `None`.
pub trait DiscoveryCursor<T: ChangeTracker> {
    fn next_batch(&mut self, tracker: &mut T) -> Option<Result<ChangeBatch<T::Descriptor>>>;
}

/// Policy for how often the tracker is asked for changes
pub trait DiscoveryStrategy<T: ChangeTracker> {
    type Cursor: DiscoveryCursor<T>;

    /// Name reported in log records, e.g. `BeforeSave`
    fn name(&self) -> &str;

    /// Begin a discovery run
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::DiscoveryNotStarted` if the strategy reads the
    /// tracker's already-discovered changes without scanning first and no
    /// discovery has run.
    fn discover(
        &self,
        options: &TriggerOptions,
        tracker: &T,
        log: Arc<dyn DiscoveryLog>,
    ) -> Result<Self::Cursor>;
}

/// Iterator over the batches of one discovery run
///
/// Holds the tracker for its whole lifetime. Use the cursor directly when
/// something else must touch the tracker between batches.
pub struct Discovery<'t, T: ChangeTracker, C> {
    tracker: &'t mut T,
    cursor: C,
}

impl<'t, T, C> Discovery<'t, T, C>
where
    T: ChangeTracker,
    C: DiscoveryCursor<T>,
{
    pub fn new(tracker: &'t mut T, cursor: C) -> Self {
        Self { tracker, cursor }
    }

    /// Run `strategy.discover` and wrap the cursor
    pub fn start<S>(
        strategy: &S,
        options: &TriggerOptions,
        tracker: &'t mut T,
        log: Arc<dyn DiscoveryLog>,
    ) -> Result<Self>
    where
        S: DiscoveryStrategy<T, Cursor = C>,
    {
        let cursor = strategy.discover(options, tracker, log)?;
        Ok(Self::new(tracker, cursor))
    }

    /// Flatten batches into individual descriptors
    ///
    /// The next batch is still computed only once every descriptor of the
    /// current batch has been pulled.
    pub fn changes(self) -> Changes<'t, T, C> {
        Changes {
            batches: self,
            pending: Vec::new().into_iter(),
        }
    }
}

impl<T, C> Iterator for Discovery<'_, T, C>
where
    T: ChangeTracker,
    C: DiscoveryCursor<T>,
{
    type Item = Result<ChangeBatch<T::Descriptor>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_batch(self.tracker)
    }
}

/// Descriptor-granularity view of a [`Discovery`]
pub struct Changes<'t, T: ChangeTracker, C> {
    batches: Discovery<'t, T, C>,
    pending: std::vec::IntoIter<T::Descriptor>,
}

impl<T, C> Iterator for Changes<'_, T, C>
where
    T: ChangeTracker,
    C: DiscoveryCursor<T>,
{
    type Item = Result<T::Descriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(change) = self.pending.next() {
                return Some(Ok(change));
            }
            match self.batches.next()? {
                Ok(batch) => self.pending = batch.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
