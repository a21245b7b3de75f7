//! Registration wizard driven end to end by nullables.

use std::sync::Arc;
use std::time::Duration;
use votesecure_client::ClientError;
use votesecure_nullables::{Call, NullBackend, NullCamera, NullSessionStore};
use votesecure_session::{SessionKey, SessionStore};
use votesecure_types::wire::{CaptureResponse, DetectResponse, RegisterResponse};
use votesecure_types::{ElecteurId, NextStep, RegistrationData};
use votesecure_wizard::{
    ErrorCategory, OtpState, RegistrationForm, RegistrationWizard, WizardConfig, WizardError,
};

fn form() -> RegistrationForm {
    RegistrationForm {
        voter_id: "VOTER123".into(),
        aadhar_id: "123456789012".into(),
        phone: "0601020304".into(),
        email: "ada@example.org".into(),
        terms_accepted: true,
    }
}

fn wizard(
    backend: &Arc<NullBackend>,
    store: &NullSessionStore,
) -> RegistrationWizard<NullBackend, NullSessionStore> {
    RegistrationWizard::new(Arc::clone(backend), store.clone(), WizardConfig::default())
}

/// Drive a fresh wizard to the face-capture step.
async fn at_capture_step(
    backend: &Arc<NullBackend>,
    store: &NullSessionStore,
) -> RegistrationWizard<NullBackend, NullSessionStore> {
    backend
        .push_register(Ok(NullBackend::registered("42")))
        .push_verify_otp(Ok(NullBackend::otp_ok(NextStep::FaceCapture)));
    let mut wizard = wizard(backend, store);
    wizard.submit_details(&form()).await.unwrap();
    wizard.verify_otp("123456").await.unwrap();
    assert_eq!(wizard.current_step(), 3);
    wizard
}

#[tokio::test]
async fn backend_rejection_leaves_step_unchanged() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Err(ClientError::Rejected("Électeur déjà inscrit".into())));
    let store = NullSessionStore::new();
    let mut wizard = wizard(&backend, &store);

    let err = wizard.submit_details(&form()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Backend);
    assert_eq!(err.user_message(), "Électeur déjà inscrit");
    assert_eq!(wizard.current_step(), 1);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn unexpected_next_step_leaves_step_unchanged() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Ok(RegisterResponse {
        next_step: Some(NextStep::Vote),
        electeur_id: Some(ElecteurId::new("42")),
    }));
    let store = NullSessionStore::new();
    let mut wizard = wizard(&backend, &store);

    assert!(wizard.submit_details(&form()).await.is_err());
    assert_eq!(wizard.current_step(), 1);
}

#[tokio::test]
async fn transport_failure_leaves_step_unchanged() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Err(ClientError::Unreachable("connection refused".into())));
    let mut wizard = wizard(&backend, &NullSessionStore::new());

    let err = wizard.submit_details(&form()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Transport);
    assert_eq!(wizard.current_step(), 1);
}

#[tokio::test]
async fn invalid_form_never_reaches_backend() {
    let backend = Arc::new(NullBackend::new());
    let mut wizard = wizard(&backend, &NullSessionStore::new());
    let bad = RegistrationForm {
        terms_accepted: false,
        ..form()
    };

    let err = wizard.submit_details(&bad).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(backend.calls().is_empty());
    assert_eq!(wizard.current_step(), 1);
}

#[tokio::test(start_paused = true)]
async fn full_registration() {
    let backend = Arc::new(NullBackend::new());
    backend.push_capture(Ok(CaptureResponse {
        message: Some("ok".into()),
        images_saved: Some(10),
    }));
    let store = NullSessionStore::new();
    let mut wizard = at_capture_step(&backend, &store).await;

    assert_eq!(store.get(SessionKey::RegistrationElecteurId).as_deref(), Some("42"));
    assert_eq!(
        store.get(SessionKey::RegistrationPhoneNumber).as_deref(),
        Some("0601020304")
    );
    assert_eq!(wizard.otp().snapshot().state, OtpState::Verified);

    let mut camera = NullCamera::new();
    let saved = wizard.capture_face(&mut camera).await.unwrap();
    assert_eq!(saved, 10);
    assert!(wizard.is_enrolled());
    // Enrollment alone does not move the wizard.
    assert_eq!(wizard.current_step(), 3);

    wizard.complete().unwrap();
    assert_eq!(wizard.current_step(), 4);
    assert!(!store.contains(SessionKey::RegistrationElecteurId));
    assert!(!store.contains(SessionKey::RegistrationPhoneNumber));
    let data: RegistrationData = store.get_json(SessionKey::RegistrationData).unwrap();
    assert_eq!(data.email.as_deref(), Some("ada@example.org"));

    assert_eq!(
        backend.count(|c| matches!(c, Call::CaptureFaces { images: 10, .. })),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn capture_submits_exactly_the_quota_when_every_second_frame_has_a_face() {
    let backend = Arc::new(NullBackend::new());
    backend.detect_with(|n| {
        Ok(if n % 2 == 0 {
            DetectResponse::detected()
        } else {
            DetectResponse::missed()
        })
    });
    backend.push_capture(Ok(CaptureResponse::default()));
    let store = NullSessionStore::new();
    let mut wizard = at_capture_step(&backend, &store).await;

    let mut camera = NullCamera::new();
    assert_eq!(wizard.capture_face(&mut camera).await.unwrap(), 10);
    assert!(camera.frames_captured() <= 20);

    let submissions: Vec<_> = backend
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CaptureFaces {
                electeur_id,
                images,
            } => Some((electeur_id, images)),
            _ => None,
        })
        .collect();
    assert_eq!(submissions, vec![(ElecteurId::new("42"), 10)]);
}

#[tokio::test(start_paused = true)]
async fn failed_capture_submits_nothing_and_blocks_completion() {
    let backend = Arc::new(NullBackend::new());
    backend.detect_with(|_| Ok(DetectResponse::missed()));
    let store = NullSessionStore::new();
    let mut wizard = at_capture_step(&backend, &store).await;

    let mut camera = NullCamera::new();
    let err = wizard.capture_face(&mut camera).await.unwrap_err();

    assert!(matches!(err, WizardError::CaptureExhausted { attempts: 30, .. }));
    assert_eq!(backend.count(|c| matches!(c, Call::CaptureFaces { .. })), 0);
    assert!(matches!(wizard.complete(), Err(WizardError::EnrollmentPending)));
    assert_eq!(wizard.current_step(), 3);
}

#[tokio::test(start_paused = true)]
async fn rejected_enrollment_is_not_enrolled() {
    let backend = Arc::new(NullBackend::new());
    backend.push_capture(Err(ClientError::Rejected("Aucun visage exploitable".into())));
    let store = NullSessionStore::new();
    let mut wizard = at_capture_step(&backend, &store).await;

    let err = wizard.capture_face(&mut NullCamera::new()).await.unwrap_err();

    assert_eq!(err.user_message(), "Aucun visage exploitable");
    assert!(!wizard.is_enrolled());
}

#[tokio::test]
async fn wrong_otp_keeps_step_two() {
    let backend = Arc::new(NullBackend::new());
    backend
        .push_register(Ok(NullBackend::registered("42")))
        .push_verify_otp(Err(ClientError::Rejected("Code OTP invalide".into())));
    let mut wizard = wizard(&backend, &NullSessionStore::new());
    wizard.submit_details(&form()).await.unwrap();

    let err = wizard.verify_otp("000000").await.unwrap_err();

    assert_eq!(err.user_message(), "Code OTP invalide");
    assert_eq!(wizard.current_step(), 2);
    assert_eq!(wizard.otp().snapshot().state, OtpState::Active);
}

#[tokio::test]
async fn short_otp_is_caught_locally() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Ok(NullBackend::registered("42")));
    let mut wizard = wizard(&backend, &NullSessionStore::new());
    wizard.submit_details(&form()).await.unwrap();

    let err = wizard.verify_otp("123").await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(backend.count(|c| matches!(c, Call::VerifyOtp(_))), 0);
}

#[tokio::test]
async fn lost_phone_number_restarts_the_wizard() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Ok(NullBackend::registered("42")));
    let store = NullSessionStore::new();
    let mut wizard = wizard(&backend, &store);
    wizard.submit_details(&form()).await.unwrap();

    let mut handle = store.clone();
    handle.remove(SessionKey::RegistrationPhoneNumber).unwrap();
    let err = wizard.verify_otp("123456").await.unwrap_err();

    assert!(matches!(err, WizardError::SessionExpired));
    assert_eq!(wizard.current_step(), 1);
    assert!(!wizard.otp().is_running());
}

#[tokio::test(start_paused = true)]
async fn otp_countdown_runs_on_step_two_and_throttles_resend() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Ok(NullBackend::registered("42")));
    let mut wizard = wizard(&backend, &NullSessionStore::new());
    wizard.submit_details(&form()).await.unwrap();

    assert!(wizard.otp().is_running());
    assert_eq!(wizard.otp().snapshot().display, "05:00");
    assert!(matches!(wizard.resend_otp(), Err(WizardError::ResendThrottled(300))));

    tokio::time::sleep(Duration::from_millis(300_500)).await;
    let snapshot = wizard.otp().snapshot();
    assert_eq!(snapshot.remaining_secs, 0);
    assert!(snapshot.resend_allowed);

    wizard.resend_otp().unwrap();
    assert_eq!(wizard.otp().snapshot().remaining_secs, 300);
    assert!(matches!(wizard.resend_otp(), Err(WizardError::ResendThrottled(30))));

    tokio::time::sleep(Duration::from_millis(30_500)).await;
    assert!(wizard.otp().snapshot().resend_allowed);
}

#[tokio::test]
async fn back_needs_no_backend_and_clears_the_countdown() {
    let backend = Arc::new(NullBackend::new());
    backend.push_register(Ok(NullBackend::registered("42")));
    let store = NullSessionStore::new();
    let mut wizard = wizard(&backend, &store);
    wizard.submit_details(&form()).await.unwrap();
    let calls = backend.calls().len();

    assert_eq!(wizard.back(), 1);
    assert_eq!(wizard.back(), 1);
    assert_eq!(backend.calls().len(), calls);
    assert!(!wizard.otp().is_running());
    // Confirmed backend state is kept.
    assert!(store.contains(SessionKey::RegistrationElecteurId));
}
