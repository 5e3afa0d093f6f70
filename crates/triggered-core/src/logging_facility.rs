//! Structured logging facility for Triggered
//!
//! - Single initialization point via `init(profile)`
//! - Operation boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   used by the trigger session around each raise
//! - Test capture mode for asserting on discovery log records
//!
//! Discovery strategies do not log through these macros directly; they report
//! to a [`DiscoveryLog`](crate::discovery::DiscoveryLog), whose tracing
//! implementation emits events with the same canonical field keys.
//!
//! # Usage
//!
//! ```rust
//! use triggered_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
