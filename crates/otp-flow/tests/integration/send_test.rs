use std::sync::Arc;

use tokio::sync::Notify;

use otp_flow::domain::types::{FlowMode, OtpInput};
use otp_flow::error::{OtpFlowError, ProviderError, ProviderErrorClass};
use otp_flow::session::SessionRestore;

use crate::helpers::{MockProvider, MockRegistry, TEST_CODE, TEST_PHONE, flow};

#[tokio::test]
async fn should_send_and_persist_session_for_signup() {
    let flow = flow(MockProvider::approving(TEST_CODE), MockRegistry::registered());

    flow.send(TEST_PHONE, FlowMode::Signup).await.unwrap();

    assert!(flow.has_confirmation());
    match flow.restore_session() {
        SessionRestore::Valid(session) => {
            assert_eq!(session.phone, TEST_PHONE);
            assert_eq!(session.mode, FlowMode::Signup);
            assert!(!session.is_expired());
        }
        other => panic!("expected valid session, got {other:?}"),
    }
    assert_eq!(flow.input(), OtpInput::empty());
    assert_eq!(flow.timer().remaining(), 30);
}

#[tokio::test]
async fn should_reset_input_echo_on_send() {
    let flow = flow(MockProvider::approving(TEST_CODE), MockRegistry::registered());
    flow.set_input_digit(0, Some('9'));
    flow.set_input_digit(1, Some('9'));
    assert!(!flow.input().is_empty());

    flow.send(TEST_PHONE, FlowMode::Signup).await.unwrap();

    assert!(flow.input().is_empty());
}

#[tokio::test]
async fn should_skip_registry_for_signup() {
    let registry = MockRegistry::failing();
    let lookups = registry.lookups_handle();
    let flow = flow(MockProvider::approving(TEST_CODE), registry);

    flow.send(TEST_PHONE, FlowMode::Signup).await.unwrap();

    assert!(lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_check_registry_with_digits_only_for_login() {
    let registry = MockRegistry::registered();
    let lookups = registry.lookups_handle();
    let flow = flow(MockProvider::approving(TEST_CODE), registry);

    flow.send(TEST_PHONE, FlowMode::Login).await.unwrap();

    assert_eq!(lookups.lock().unwrap().as_slice(), ["919876543210"]);
}

#[tokio::test]
async fn should_fail_fast_when_phone_not_registered() {
    let provider = MockProvider::approving(TEST_CODE);
    let sends = provider.sends_handle();
    let flow = flow(provider, MockRegistry::unregistered());

    let result = flow.send("+910000000000", FlowMode::Login).await;

    assert!(
        matches!(result, Err(OtpFlowError::UserNotRegistered)),
        "expected UserNotRegistered, got {result:?}"
    );
    // The provider is never reached.
    assert!(sends.lock().unwrap().is_empty());
    assert!(matches!(flow.restore_session(), SessionRestore::Absent));
}

#[tokio::test]
async fn should_distinguish_registry_failure_from_negative_result() {
    let provider = MockProvider::approving(TEST_CODE);
    let sends = provider.sends_handle();
    let flow = flow(provider, MockRegistry::failing());

    let result = flow.send(TEST_PHONE, FlowMode::Login).await;

    match result {
        Err(e @ OtpFlowError::PhoneCheckFailed(_)) => {
            assert_eq!(e.kind(), "PHONE_CHECK_FAILED");
        }
        other => panic!("expected PhoneCheckFailed, got {other:?}"),
    }
    assert!(sends.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_surface_billing_error_without_mutating_state() {
    let err = ProviderError::new(
        "20003",
        "Verify billing not enabled on account",
        ProviderErrorClass::Billing,
    );
    let flow = flow(
        MockProvider::failing_send(TEST_CODE, err),
        MockRegistry::registered(),
    );

    let result = flow.send(TEST_PHONE, FlowMode::Signup).await;

    assert!(
        matches!(
            &result,
            Err(OtpFlowError::BillingNotEnabled(m)) if m.contains("billing")
        ),
        "expected BillingNotEnabled, got {result:?}"
    );
    assert!(!flow.has_confirmation());
    assert!(matches!(flow.restore_session(), SessionRestore::Absent));
    assert_eq!(flow.timer().remaining(), 0);
}

#[tokio::test]
async fn should_release_guard_after_provider_failure() {
    let err = ProviderError::other("60200", "invalid parameter");
    let flow = flow(
        MockProvider::failing_send(TEST_CODE, err),
        MockRegistry::registered(),
    );

    let result = flow.send(TEST_PHONE, FlowMode::Signup).await;
    assert!(
        matches!(&result, Err(OtpFlowError::Provider { code, .. }) if code == "60200"),
        "expected Provider passthrough, got {result:?}"
    );

    // The in-flight guard was released, so a retry goes through.
    flow.send(TEST_PHONE, FlowMode::Signup).await.unwrap();
    assert!(flow.has_confirmation());
}

#[tokio::test]
async fn should_short_circuit_second_send_while_first_in_flight() {
    let gate = Arc::new(Notify::new());
    let provider = MockProvider::approving(TEST_CODE).with_send_gate(Arc::clone(&gate));
    let sends = provider.sends_handle();
    let flow = Arc::new(flow(provider, MockRegistry::registered()));

    let first = tokio::spawn({
        let flow = Arc::clone(&flow);
        async move { flow.send(TEST_PHONE, FlowMode::Signup).await }
    });
    // Let the first send reach the provider and park there.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    let second = flow.send(TEST_PHONE, FlowMode::Signup).await;
    assert!(
        matches!(second, Err(OtpFlowError::SendInFlight)),
        "expected SendInFlight, got {second:?}"
    );

    gate.notify_one();
    first.await.unwrap().unwrap();

    // Exactly one provider call was made.
    assert_eq!(sends.lock().unwrap().len(), 1);
    assert!(flow.has_confirmation());
}

#[tokio::test]
async fn should_supersede_prior_session_on_resend() {
    let flow = flow(MockProvider::approving(TEST_CODE), MockRegistry::registered());

    flow.send("+911111111111", FlowMode::Signup).await.unwrap();
    flow.send(TEST_PHONE, FlowMode::Signup).await.unwrap();

    match flow.restore_session() {
        SessionRestore::Valid(session) => assert_eq!(session.phone, TEST_PHONE),
        other => panic!("expected valid session, got {other:?}"),
    }
    assert_eq!(flow.timer().remaining(), 30);
}
