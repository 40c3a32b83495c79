mod common;

use common::MockTransport;
use licensekeys_client::{LicenseClient, RawResponse, ValidateOptions, Validation};

#[tokio::test]
async fn unreachable_without_retry_returns_false() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let valid = client
        .validate(|| Ok(common::record()), |_| {}, ValidateOptions::default())
        .await
        .unwrap();
    assert!(!valid);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn exhausted_budget_without_local_evidence_is_invalid() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let options = ValidateOptions {
        retry: true,
        max_retries: 0,
    };
    let valid = client
        .validate(|| Ok(common::record()), |_| {}, options)
        .await
        .unwrap();
    assert!(!valid);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn unreachable_host_trusts_unexpired_local_state() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let valid = client
        .validate(
            || Ok(common::unexpired_record()),
            |_| {},
            ValidateOptions::with_retry(),
        )
        .await
        .unwrap();
    assert!(valid);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn retry_attempt_is_persisted_through_the_sink() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let mut persisted = Vec::new();
    client
        .validate(
            || Ok(common::record()),
            |s| persisted.push(s.to_string()),
            ValidateOptions::with_retry(),
        )
        .await
        .unwrap();
    assert_eq!(persisted.len(), 1);
    assert!(persisted[0].contains(r#""retries":1"#));
}

#[tokio::test]
async fn spent_budget_makes_no_further_attempts() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let mut persisted = Vec::new();
    let valid = client
        .validate(
            || Ok(common::retried_record(2)),
            |s| persisted.push(s.to_string()),
            ValidateOptions::with_retry(),
        )
        .await
        .unwrap();
    assert!(!valid);
    assert_eq!(transport.call_count(), 1);
    assert!(persisted.is_empty());
}

#[tokio::test]
async fn at_most_one_extra_attempt_per_invocation() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let options = ValidateOptions {
        retry: true,
        max_retries: 10,
    };
    let valid = client
        .validate(|| Ok(common::record()), |_| {}, options)
        .await
        .unwrap();
    assert!(!valid);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn application_errors_are_never_retried() {
    let transport = MockTransport::payload(r#"{"error":true,"message":"license expired"}"#);
    let client = LicenseClient::new(&transport);
    let valid = client
        .validate(
            || Ok(common::unexpired_record()),
            |_| {},
            ValidateOptions::with_retry(),
        )
        .await
        .unwrap();
    assert!(!valid);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn empty_responses_are_never_retried() {
    let transport = MockTransport::once(RawResponse::Empty);
    let client = LicenseClient::new(&transport);
    let valid = client
        .validate(
            || Ok(common::unexpired_record()),
            |_| {},
            ValidateOptions::with_retry(),
        )
        .await
        .unwrap();
    assert!(!valid);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn retry_then_recovery_resets_the_counter() {
    let transport = MockTransport::new(vec![
        RawResponse::Unreachable("connection refused".to_string()),
        RawResponse::Payload(r#"{"error":false,"data":{"activation_id":1,"expire":897}}"#.to_string()),
    ]);
    let client = LicenseClient::new(&transport);
    let mut persisted = Vec::new();
    let valid = client
        .validate(
            || Ok(common::record()),
            |s| persisted.push(s.to_string()),
            ValidateOptions::with_retry(),
        )
        .await
        .unwrap();
    assert!(valid);
    assert_eq!(persisted.len(), 2);
    assert!(persisted[0].contains(r#""retries":1"#));
    assert!(persisted[1].contains(r#""retries":0"#));
    assert!(persisted[1].contains(r#""activation_id":1"#));
}

#[tokio::test]
async fn validate_full_reports_the_unreachable_distinction() {
    let transport = MockTransport::unreachable();
    let client = LicenseClient::new(&transport);
    let outcome = client
        .validate_full(
            || Ok(common::unexpired_record()),
            |_| {},
            ValidateOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Validation::Unreachable { locally_valid: true });
}
