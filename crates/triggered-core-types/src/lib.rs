//! Core types shared by the Triggered discovery engine and its logging
//!
//! - **Correlation types**: `SessionId` identifying one trigger session
//! - **Schema constants**: canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::SessionId;
