//! Triggered Core - change discovery for trigger dispatch
//!
//! Finds which tracked entities changed so triggers can react to them, and
//! keeps finding them while the triggers' own changes keep coming:
//! - Discovery strategies: single-pass and recursive with a recursion cap
//! - Change tracker contract plus an in-memory tracker
//! - Trigger session driving before-save and after-save dispatch
//! - Structured error facility and tracing-based logging facility
//! - TOML settings

pub mod config;
pub mod discovery;
pub mod errors;
pub mod logging_facility;
pub mod session;
pub mod tracker;

#[doc(hidden)]
pub use tracing;
pub use triggered_core_types;

// Re-export commonly used types
pub use config::{Settings, TriggerOptions};
pub use discovery::{
    Discovery, DiscoveryCursor, DiscoveryLog, DiscoveryStrategy, NonRecursiveDiscoveryStrategy,
    NoopDiscoveryLog, RecursiveDiscoveryStrategy, TracingDiscoveryLog,
};
pub use errors::{ExError, ExErrorKind, Result, TriggerError};
pub use session::{TriggerDispatcher, TriggerPhase, TriggerSession};
pub use tracker::{ChangeBatch, ChangeTracker, ChangeType, TriggerContextDescriptor, TriggerContextTracker};
