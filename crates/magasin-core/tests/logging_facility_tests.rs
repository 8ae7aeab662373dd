#![allow(clippy::unwrap_used, clippy::expect_used)]

use magasin_core::errors::{ExError, ExErrorKind, MagasinError};
use magasin_core::logging_facility::test_capture::init_test_capture;
use magasin_core::{log_op_end, log_op_error, log_op_start};
use magasin_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_carries_extra_fields() {
    let capture = init_test_capture();
    let op_name = "logging_test_start_unique_1";

    log_op_start!(op_name, commande_id = 17_i64);

    let starts: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].field("commande_id"), Some("17"));
    assert!(starts[0]
        .component
        .as_deref()
        .unwrap_or_default()
        .contains("logging_facility_tests"));
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "logging_test_end_unique_2";

    log_op_end!(op_name, duration_ms = 42_u64);

    let ends: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_converts_domain_error() {
    let capture = init_test_capture();
    let op_name = "logging_test_error_unique_3";

    let err = MagasinError::CommandeNotFound {
        famille: "interne".to_string(),
        commande_id: 5,
    };
    log_op_error!(op_name, err, duration_ms = 10_u64);

    let errors: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err_code"), Some("ERR_NOT_FOUND"));
    assert_eq!(errors[0].level, tracing::Level::ERROR);
}

#[test]
fn test_log_op_error_accepts_ex_error() {
    let capture = init_test_capture();
    let op_name = "logging_test_error_unique_4";

    let err = ExError::new(ExErrorKind::ConstraintViolation).with_message("FOREIGN KEY constraint failed");
    log_op_error!(op_name, err, duration_ms = 1_u64, commande_id = 3_i64);

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let event = &capture.events_for_op(op_name)[0];
    assert_eq!(event.field("err_code"), Some("ERR_CONSTRAINT_VIOLATION"));
    assert_eq!(event.field("commande_id"), Some("3"));
}
