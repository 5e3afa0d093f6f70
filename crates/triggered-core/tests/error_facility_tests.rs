use triggered_core::errors::{ExError, ExErrorKind, TriggerError};

#[test]
fn test_sequencing_error_verifiable_by_kind() {
    let ex_err: ExError = TriggerError::DiscoveryNotStarted.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidSequencing);
    assert_eq!(ex_err.code(), "ERR_INVALID_SEQUENCING");
    assert!(ex_err.message().contains("has not yet started"));
    assert_eq!(ex_err.strategy(), None);
}

#[test]
fn test_recursion_error_carries_strategy_and_iteration() {
    let err = TriggerError::MaxRecursionReached {
        name: "BeforeSave".to_string(),
        max_recursion: 100,
        iteration: 101,
    };
    assert!(err.to_string().starts_with("MaxRecursion was reached"));

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::RecursionExceeded);
    assert_eq!(ex_err.code(), "ERR_RECURSION_EXCEEDED");
    assert_eq!(ex_err.strategy(), Some("BeforeSave"));
    assert_eq!(ex_err.iteration(), Some(101));
}

#[test]
fn test_sequencing_distinct_from_recursion() {
    let sequencing: ExError = TriggerError::DiscoveryNotStarted.into();
    let recursion: ExError = TriggerError::MaxRecursionReached {
        name: "BeforeSave".to_string(),
        max_recursion: 0,
        iteration: 1,
    }
    .into();

    assert_ne!(sequencing.kind(), recursion.kind());
    assert_ne!(sequencing.code(), recursion.code());
}

#[test]
fn test_dispatch_error_maps_to_trigger_failed() {
    let ex_err: ExError = TriggerError::Dispatch {
        reason: "audit table locked".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::TriggerFailed);
    assert!(ex_err.message().contains("audit table locked"));
}

#[test]
fn test_settings_errors_carry_load_op() {
    let io: ExError = TriggerError::Io {
        message: "missing".to_string(),
    }
    .into();
    let parse: ExError = TriggerError::Serialization {
        message: "bad toml".to_string(),
    }
    .into();

    assert_eq!(io.kind(), ExErrorKind::Io);
    assert_eq!(io.op(), Some("load_settings"));
    assert_eq!(parse.kind(), ExErrorKind::Serialization);
    assert_eq!(parse.op(), Some("load_settings"));
}

#[test]
fn test_error_kind_codes_are_unique() {
    let kinds = [
        ExErrorKind::InvalidSequencing,
        ExErrorKind::RecursionExceeded,
        ExErrorKind::TriggerFailed,
        ExErrorKind::Io,
        ExErrorKind::Serialization,
    ];

    for (i, a) in kinds.iter().enumerate() {
        assert!(a.code().starts_with("ERR_"));
        for b in &kinds[i + 1..] {
            assert_ne!(a.code(), b.code(), "{:?} and {:?} share a code", a, b);
        }
    }
}
