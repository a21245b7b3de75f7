//! Capture loop and recognition poller against scripted backends.

use votesecure_client::{ClientError, Recognition};
use votesecure_nullables::{Call, NullBackend, NullCamera};
use votesecure_types::wire::DetectResponse;
use votesecure_types::SessionToken;
use votesecure_wizard::capture::collect_faces;
use votesecure_wizard::recognition::recognize_face;
use votesecure_wizard::{CameraError, FrameSource, StopFlag, WizardConfig, WizardError};

fn detects(call: &Call) -> bool {
    matches!(call, Call::DetectFace)
}

fn recognizes(call: &Call) -> bool {
    matches!(call, Call::RecognizeFace)
}

#[tokio::test(start_paused = true)]
async fn capture_every_second_frame_fills_quota_within_twenty_attempts() {
    let backend = NullBackend::new();
    backend.detect_with(|n| {
        Ok(if n % 2 == 0 {
            DetectResponse::detected()
        } else {
            DetectResponse::missed()
        })
    });
    let mut camera = NullCamera::new();

    let frames = collect_faces(
        &backend,
        &mut camera,
        &WizardConfig::default(),
        &StopFlag::new(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(frames.len(), 10);
    assert!(backend.count(detects) <= 20);
    assert_eq!(frames[0], "frame-2");
    assert!(!camera.is_open());
}

#[tokio::test(start_paused = true)]
async fn capture_never_detecting_stops_at_ceiling() {
    let backend = NullBackend::new();
    backend.detect_with(|_| Ok(DetectResponse::missed()));
    let mut camera = NullCamera::new();

    let err = collect_faces(
        &backend,
        &mut camera,
        &WizardConfig::default(),
        &StopFlag::new(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        WizardError::CaptureExhausted {
            accepted: 0,
            quota: 10,
            attempts: 30
        }
    ));
    assert_eq!(backend.count(detects), 30);
    assert_eq!(camera.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn capture_detect_errors_consume_attempts_and_continue() {
    let backend = NullBackend::new();
    backend.detect_with(|n| {
        if n <= 2 {
            Err(ClientError::Unreachable("connection refused".into()))
        } else {
            Ok(DetectResponse::detected())
        }
    });
    let config = WizardConfig {
        capture_quota: 3,
        ..WizardConfig::default()
    };
    let mut camera = NullCamera::new();

    let frames = collect_faces(&backend, &mut camera, &config, &StopFlag::new(), None)
        .await
        .unwrap();

    assert_eq!(frames, vec!["frame-3", "frame-4", "frame-5"]);
    assert_eq!(backend.count(detects), 5);
}

#[tokio::test(start_paused = true)]
async fn capture_reports_progress() {
    let backend = NullBackend::new();
    let (tx, rx) = tokio::sync::watch::channel(Default::default());
    let config = WizardConfig {
        capture_quota: 2,
        ..WizardConfig::default()
    };
    let mut camera = NullCamera::new();

    collect_faces(&backend, &mut camera, &config, &StopFlag::new(), Some(&tx))
        .await
        .unwrap();

    let status = rx.borrow().clone();
    assert_eq!(status.accepted, 2);
    assert_eq!(status.quota, 2);
    assert_eq!(status.attempts, 2);
}

#[tokio::test]
async fn capture_without_camera_makes_no_calls() {
    let backend = NullBackend::new();
    let mut camera = NullCamera::failing_open(CameraError::PermissionDenied);

    let err = collect_faces(
        &backend,
        &mut camera,
        &WizardConfig::default(),
        &StopFlag::new(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WizardError::Camera(CameraError::PermissionDenied)));
    assert_eq!(err.user_message(), "Accès à la caméra refusé");
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn recognition_succeeds_on_third_call() {
    let backend = NullBackend::new();
    backend
        .push_recognize(Ok(NullBackend::not_recognized()))
        .push_recognize(Ok(NullBackend::not_recognized()))
        .push_recognize(Ok(NullBackend::recognized()));
    let mut camera = NullCamera::new();
    let token = SessionToken::new("tok");

    let recognized = recognize_face(
        &backend,
        &mut camera,
        &token,
        &WizardConfig::default(),
        &StopFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(recognized.attempts, 3);
    assert_eq!(backend.count(recognizes), 3);
}

#[tokio::test(start_paused = true)]
async fn recognition_mismatch_stops_immediately() {
    let backend = NullBackend::new();
    backend
        .push_recognize(Ok(Recognition::Mismatch {
            message: Some("Le visage ne correspond pas à la session.".into()),
        }))
        .push_recognize(Ok(NullBackend::recognized()));
    let mut camera = NullCamera::new();

    let err = recognize_face(
        &backend,
        &mut camera,
        &SessionToken::new("tok"),
        &WizardConfig::default(),
        &StopFlag::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WizardError::FaceMismatch(_)));
    assert_eq!(err.user_message(), "Le visage ne correspond pas à la session.");
    assert_eq!(backend.count(recognizes), 1);
}

#[tokio::test(start_paused = true)]
async fn recognition_gives_up_after_five_attempts() {
    let backend = NullBackend::new();
    for _ in 0..6 {
        backend.push_recognize(Ok(NullBackend::not_recognized()));
    }
    let mut camera = NullCamera::new();

    let err = recognize_face(
        &backend,
        &mut camera,
        &SessionToken::new("tok"),
        &WizardConfig::default(),
        &StopFlag::new(),
    )
    .await
    .unwrap_err();

    match err {
        WizardError::RecognitionExhausted { attempts, message } => {
            assert_eq!(attempts, 5);
            assert_eq!(message.as_deref(), Some("Visage non reconnu."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.count(recognizes), 5);
}

#[tokio::test(start_paused = true)]
async fn recognition_transport_error_fails_the_poll() {
    let backend = NullBackend::new();
    backend.detect_with(|n| {
        if n == 2 {
            Err(ClientError::Status(502))
        } else {
            Ok(DetectResponse::detected())
        }
    });
    backend.push_recognize(Ok(NullBackend::not_recognized()));
    let mut camera = NullCamera::new();

    let err = recognize_face(
        &backend,
        &mut camera,
        &SessionToken::new("tok"),
        &WizardConfig::default(),
        &StopFlag::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WizardError::Transport(ClientError::Status(502))));
    assert_eq!(backend.count(detects), 2);
    assert_eq!(camera.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn low_confidence_frames_are_not_sent_for_recognition() {
    let backend = NullBackend::new();
    backend.detect_with(|_| {
        Ok(DetectResponse {
            detected: true,
            confidence: Some(0.4),
            reason: None,
        })
    });
    let config = WizardConfig {
        recognition_max_ticks: 10,
        ..WizardConfig::default()
    };
    let mut camera = NullCamera::new();

    let err = recognize_face(
        &backend,
        &mut camera,
        &SessionToken::new("tok"),
        &config,
        &StopFlag::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WizardError::NoFaceDetected { ticks: 10 }));
    assert_eq!(backend.count(recognizes), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_while_in_flight_discards_the_answer() {
    let backend = NullBackend::new();
    let stop = StopFlag::new();
    let remote = stop.clone();
    backend.detect_with(move |n| {
        if n == 2 {
            remote.stop();
        }
        Ok(DetectResponse::detected())
    });
    backend
        .push_recognize(Ok(NullBackend::not_recognized()))
        .push_recognize(Ok(NullBackend::recognized()));
    let mut camera = NullCamera::new();

    let err = recognize_face(
        &backend,
        &mut camera,
        &SessionToken::new("tok"),
        &WizardConfig::default(),
        &stop,
    )
    .await
    .unwrap_err();

    // The second recognize call did answer "recognized", but after the stop.
    assert!(matches!(err, WizardError::Stopped));
    assert_eq!(backend.count(recognizes), 2);
}
