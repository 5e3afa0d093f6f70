//! Canonical schema constants for structured logging
//!
//! These constants keep discovery and session events consistent across
//! strategies, the session driver and test assertions.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_SESSION_ID: &str = "session_id";

// Discovery fields
pub const FIELD_NAME: &str = "name";
pub const FIELD_CHANGES: &str = "changes";
pub const FIELD_ITERATION: &str = "iteration";
pub const FIELD_MAX_RECURSION: &str = "max_recursion";
pub const FIELD_DISPATCHED: &str = "dispatched";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical operation event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Discovery event names
pub const EVENT_DISCOVERY_STARTED: &str = "discovery_started";
pub const EVENT_CHANGES_DETECTED: &str = "changes_detected";
pub const EVENT_DISCOVERY_COMPLETED: &str = "discovery_completed";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_CHANGES.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_CHANGES_DETECTED.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        let names = [
            EVENT_START,
            EVENT_END,
            EVENT_END_ERROR,
            EVENT_DISCOVERY_STARTED,
            EVENT_CHANGES_DETECTED,
            EVENT_DISCOVERY_COMPLETED,
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
