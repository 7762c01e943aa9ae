//! End-to-end tests driving a flow through its handle:
//! camera frames → liveness → capture → local gate → cross-check → outcome,
//! with nullable collaborators standing in for the device and network.

use ageproof_flow::{FlowConfig, FlowError, FlowHandle, ShutdownController, VerificationFlow};
use ageproof_nullables::{NullCamera, NullClock, NullOcr, NullRemoteVerifier, RecordingSink};
use ageproof_types::{
    Clock, ConfidenceLevel, FaceObservation, FaceState, Recommendation, RiskLevel, Timestamp,
};
use ageproof_verification::{
    CaptureError, Collaborators, ExtractionFailure, FraudAssessment, HapticCue, ImageHandle,
    LocalOcrFields, OutcomeCategory, OutcomeKind, PresentationEvent, RemoteError, RemoteVerdict,
    RemoteVerifier, VerificationOutcome,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 2026-06-15T00:00:00Z
const NOW_MS: u64 = 1_781_481_600_000;
const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    handle: FlowHandle,
    task: JoinHandle<()>,
    camera: Arc<NullCamera>,
    ocr: Arc<NullOcr>,
    remote: Arc<NullRemoteVerifier>,
    sink: Arc<RecordingSink>,
    shutdown: ShutdownController,
}

fn today() -> NaiveDate {
    NullClock::new(NOW_MS).now().date()
}

fn spawn_flow(ocr: NullOcr, config: FlowConfig) -> Harness {
    spawn_flow_with_remote(ocr, config, None)
}

/// Spawn a flow over nullables. `remote` replaces the null verifier when set.
fn spawn_flow_with_remote(
    ocr: NullOcr,
    config: FlowConfig,
    remote: Option<Arc<dyn RemoteVerifier>>,
) -> Harness {
    let camera = Arc::new(NullCamera::new());
    let ocr = Arc::new(ocr);
    let null_remote = Arc::new(NullRemoteVerifier::new());
    let sink = Arc::new(RecordingSink::new());
    let shutdown = ShutdownController::new();

    let collaborators = Collaborators {
        capture: camera.clone(),
        ocr: ocr.clone(),
        remote: remote.unwrap_or_else(|| null_remote.clone() as Arc<dyn RemoteVerifier>),
        clock: Arc::new(NullClock::new(NOW_MS)),
    };
    let (handle, task) =
        VerificationFlow::spawn(&config, collaborators, sink.clone(), shutdown.subscribe())
            .expect("valid config");

    Harness {
        handle,
        task,
        camera,
        ocr,
        remote: null_remote,
        sink,
        shutdown,
    }
}

fn harness_aged(age: u32) -> Harness {
    spawn_flow(NullOcr::aged(age, today()), FlowConfig::default())
}

impl Harness {
    async fn ready(&self) {
        self.handle.camera_ready().await.unwrap();
        // Snapshot is processed after CameraReady: a barrier.
        self.handle.snapshot().await.unwrap();
    }

    /// Hold a frontal face for the full duration starting at `start_ms`.
    fn hold(&self, start_ms: u64) {
        for offset in [0, 500, 1_000, 1_500, 2_000] {
            let frame = FaceObservation::face(3.0, Timestamp::from_millis(start_ms + offset));
            assert!(self.handle.observe(frame), "frame at +{offset} dropped");
        }
    }

    async fn wait_outcomes(&self, n: usize) -> VerificationOutcome {
        tokio::time::timeout(
            WAIT,
            self.sink
                .wait_for(n, |e| matches!(e, PresentationEvent::Outcome { .. })),
        )
        .await
        .expect("outcome published in time");
        self.sink.outcomes().pop().unwrap()
    }

    fn count(&self, pred: impl Fn(&PresentationEvent) -> bool) -> usize {
        self.sink.count(pred)
    }
}

fn fraud_verdict() -> RemoteVerdict {
    RemoteVerdict {
        verified: true,
        audit_id: Some("abc123".into()),
        extracted_age: Some(70),
        discrepancy_note: Some("template mismatch on MRZ".into()),
        confidence_level: Some(ConfidenceLevel::High),
        age_mismatch: false,
        fraud: Some(FraudAssessment {
            detected: true,
            risk_level: Some(RiskLevel::High),
            recommendation: Some(Recommendation::Reject),
            diagnostics: vec!["screen replay detected".into()],
        }),
    }
}

/// A remote verifier whose SDK panics.
struct PanickingRemote;

fn explode() -> Result<RemoteVerdict, RemoteError> {
    panic!("remote SDK bug")
}

#[async_trait]
impl RemoteVerifier for PanickingRemote {
    async fn verify(
        &self,
        _image: &ImageHandle,
        _fields: &LocalOcrFields,
    ) -> Result<RemoteVerdict, RemoteError> {
        explode()
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_local_gate_rejects_without_remote_call() {
    let h = harness_aged(45);
    h.ready().await;
    h.hold(10_000);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::AgeRejected);
    assert!(!outcome.verified);
    assert_eq!(outcome.extracted_age, None);
    assert_eq!(h.remote.calls(), 0);

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(!snapshot.in_flight);
    assert_eq!(snapshot.ocr.and_then(|o| o.age_years), Some(45));
}

#[tokio::test]
async fn scenario_b_remote_approval_hands_over_image() {
    let h = harness_aged(65);
    h.ready().await;
    h.hold(0);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::Approved);
    assert!(outcome.verified);
    assert_eq!(outcome.audit_id.as_deref(), Some("null-audit"));
    assert_eq!(
        h.count(|e| matches!(e, PresentationEvent::Outcome { image: Some(_), .. })),
        1
    );

    let sent = h.remote.received();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].age_years, 65);
    assert_eq!(sent[0].minimum_age, 60);
    assert!(!h.handle.snapshot().await.unwrap().in_flight);
}

#[tokio::test]
async fn scenario_c_fraud_forwards_only_safe_fields() {
    let h = harness_aged(70);
    h.remote.respond_with(Ok(fraud_verdict()));
    h.ready().await;
    h.hold(0);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::FraudRejected);
    assert_eq!(outcome.kind.category(), OutcomeCategory::FraudRejected);
    assert_eq!(outcome.audit_id.as_deref(), Some("abc123"));
    assert_eq!(outcome.fraud.risk_level, Some(RiskLevel::High));
    assert_eq!(outcome.fraud.recommendation, Some(Recommendation::Reject));
    assert_eq!(outcome.extracted_age, None);
    assert_eq!(outcome.discrepancy_note, None);
    assert_eq!(outcome.confidence_level, None);
    assert_eq!(
        h.count(|e| matches!(e, PresentationEvent::Outcome { image: Some(_), .. })),
        0
    );
}

#[tokio::test]
async fn scenario_d_unreadable_document_is_validation_error() {
    let h = spawn_flow(
        NullOcr::failing(ExtractionFailure::Unreadable),
        FlowConfig::default(),
    );
    h.ready().await;
    h.hold(0);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::RetakeRecommended);
    assert_eq!(outcome.kind.category(), OutcomeCategory::ValidationError);
    assert_eq!(h.remote.calls(), 0);
    assert!(!h.handle.snapshot().await.unwrap().in_flight);
}

#[tokio::test]
async fn scenario_e_retake_discards_stale_state() {
    let h = harness_aged(45);
    h.ready().await;
    h.hold(0);
    h.wait_outcomes(1).await;
    assert!(!h.handle.is_active());

    h.handle.retake().await.unwrap();
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.state, FaceState::Searching);
    assert_eq!(snapshot.session.progress_percent, 0);
    assert_eq!(snapshot.session.stable_since, None);
    assert!(snapshot.ocr.is_none());
    assert!(snapshot.outcome.is_none());
    assert!(snapshot.camera_active);
    assert_eq!(snapshot.generation, 1);

    // Repeated retake does not fire side effects again.
    h.handle.retake().await.unwrap();
    h.handle.snapshot().await.unwrap();
    assert_eq!(h.count(|e| *e == PresentationEvent::RetryRequested), 1);

    // Liveness must be redone and starts a fresh attempt.
    h.hold(10_000);
    h.wait_outcomes(2).await;
    assert_eq!(h.camera.calls(), 2);
    assert_eq!(h.ocr.calls(), 2);
}

// ---------------------------------------------------------------------------
// Liveness events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn liveness_events_reach_presentation_in_order() {
    let h = harness_aged(65);
    h.ready().await;
    h.hold(0);
    h.wait_outcomes(1).await;

    let milestones = h.sink.inspect(|events| {
        events
            .iter()
            .filter_map(|e| match e {
                PresentationEvent::Haptic(HapticCue::Milestone(p)) => Some(*p),
                _ => None,
            })
            .collect::<Vec<_>>()
    });
    assert_eq!(milestones, vec![25, 50, 75]);
    assert_eq!(h.count(|e| *e == PresentationEvent::LivenessPassed), 1);
    assert_eq!(
        h.count(|e| matches!(e, PresentationEvent::VerificationStarted { .. })),
        1
    );
}

#[tokio::test]
async fn frames_before_camera_ready_are_dropped() {
    let h = harness_aged(65);
    assert!(!h.handle.observe(FaceObservation::face(0.0, Timestamp::EPOCH)));
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.state, FaceState::Idle);
}

#[tokio::test]
async fn retake_before_camera_ready_keeps_the_camera_gated() {
    let h = harness_aged(65);
    h.handle.retake().await.unwrap();

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.state, FaceState::Idle);
    assert!(!snapshot.camera_active);
    assert!(!h.handle.observe(FaceObservation::face(0.0, Timestamp::EPOCH)));
    assert_eq!(h.count(|e| *e == PresentationEvent::RetryRequested), 0);

    // Readiness still works afterwards.
    h.ready().await;
    assert!(h.handle.is_active());
}

#[tokio::test]
async fn full_mailbox_drops_frames_but_not_intents() {
    let config = FlowConfig {
        frame_queue_capacity: 1,
        ..FlowConfig::default()
    };
    let h = spawn_flow(NullOcr::aged(65, today()), config);
    h.ready().await;

    // Single-threaded runtime: the consumer cannot drain between these.
    assert!(h.handle.observe(FaceObservation::face(0.0, Timestamp::EPOCH)));
    assert!(!h.handle.observe(FaceObservation::face(0.0, Timestamp::from_millis(100))));

    h.handle.retake().await.unwrap();
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.session.state, FaceState::Searching);
    assert_eq!(h.count(|e| *e == PresentationEvent::RetryRequested), 1);
}

#[tokio::test]
async fn unstable_hold_never_starts_verification() {
    let h = harness_aged(65);
    h.ready().await;
    for i in 0..10u64 {
        let t = Timestamp::from_millis(i * 1_500);
        assert!(h.handle.observe(FaceObservation::face(0.0, t)));
        assert!(h.handle.observe(FaceObservation::face(40.0, t.plus_millis(1_000))));
    }
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.state, FaceState::Detected);
    assert_eq!(h.camera.calls(), 0);
}

// ---------------------------------------------------------------------------
// Failures, retries, cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn capture_failure_resets_liveness() {
    let h = harness_aged(65);
    h.camera.fail_next(CaptureError::Failed("shutter".into()));
    h.ready().await;
    h.hold(0);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::TransientError);
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.state, FaceState::Searching);
    assert!(snapshot.camera_active);
    assert!(!snapshot.in_flight);
    assert_eq!(h.ocr.calls(), 0);

    h.hold(5_000);
    assert_eq!(h.wait_outcomes(2).await.kind, OutcomeKind::Approved);
}

#[tokio::test]
async fn transient_remote_error_retries_cross_check_only() {
    let h = harness_aged(65);
    h.remote
        .respond_with(Err(RemoteError::Transport("connection reset".into())));
    h.ready().await;
    h.hold(0);

    let first = h.wait_outcomes(1).await;
    assert_eq!(first.kind, OutcomeKind::TransientError);
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.state, FaceState::Verified);
    assert!(snapshot.ocr.is_some());

    h.handle.retry_verification().await.unwrap();
    let second = h.wait_outcomes(2).await;
    assert_eq!(second.kind, OutcomeKind::Approved);
    assert_eq!(h.camera.calls(), 1);
    assert_eq!(h.ocr.calls(), 1);
    assert_eq!(h.remote.calls(), 2);
}

#[tokio::test]
async fn malformed_remote_response_is_transient_and_retryable() {
    let h = harness_aged(65);
    h.remote
        .respond_with(Err(RemoteError::Malformed("missing auditId".into())));
    h.ready().await;
    h.hold(0);

    let first = h.wait_outcomes(1).await;
    assert_eq!(first.kind, OutcomeKind::TransientError);
    assert_eq!(
        first.message.as_deref(),
        Some("verification service unavailable, please retry")
    );

    h.handle.retry_verification().await.unwrap();
    assert_eq!(h.wait_outcomes(2).await.kind, OutcomeKind::Approved);
    assert_eq!(h.ocr.calls(), 1);
}

#[tokio::test]
async fn retry_without_transient_failure_is_ignored() {
    let h = harness_aged(45);
    h.ready().await;
    h.hold(0);
    h.wait_outcomes(1).await;

    h.handle.retry_verification().await.unwrap();
    h.handle.snapshot().await.unwrap();
    assert_eq!(h.sink.outcomes().len(), 1);
    assert_eq!(h.camera.calls(), 1);
}

#[tokio::test]
async fn remote_timeout_has_distinct_message() {
    let config = FlowConfig {
        remote_timeout_ms: Some(50),
        ..FlowConfig::default()
    };
    let h = spawn_flow(NullOcr::aged(65, today()), config);
    h.remote.stall();
    h.ready().await;
    h.hold(0);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::TransientError);
    assert_eq!(
        outcome.message.as_deref(),
        Some("verification timed out, please retry")
    );
}

#[tokio::test]
async fn retake_mid_cross_check_discards_late_result() {
    let h = harness_aged(65);
    h.remote.stall();
    h.ready().await;
    h.hold(0);
    tokio::time::timeout(WAIT, h.remote.wait_for_call())
        .await
        .unwrap();

    h.handle.retake().await.unwrap();
    h.remote.release();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.outcome.is_none());
    assert!(!snapshot.in_flight);
    assert_eq!(snapshot.session.state, FaceState::Searching);
    assert!(h.sink.outcomes().is_empty());

    // The next hold runs a fresh, unstalled attempt.
    h.hold(10_000);
    assert_eq!(h.wait_outcomes(1).await.kind, OutcomeKind::Approved);
}

#[tokio::test]
async fn panicking_collaborator_becomes_transient_error() {
    let h = spawn_flow_with_remote(
        NullOcr::aged(65, today()),
        FlowConfig::default(),
        Some(Arc::new(PanickingRemote)),
    );
    h.ready().await;
    h.hold(0);

    let outcome = h.wait_outcomes(1).await;
    assert_eq!(outcome.kind, OutcomeKind::TransientError);
    assert!(!h.handle.snapshot().await.unwrap().in_flight);
}

// ---------------------------------------------------------------------------
// Exit and teardown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exit_fires_once_and_forwards_nothing() {
    let h = harness_aged(70);
    h.remote.stall();
    h.ready().await;
    h.hold(0);
    tokio::time::timeout(WAIT, h.remote.wait_for_call())
        .await
        .unwrap();

    h.handle.exit().await.unwrap();
    h.handle.exit().await.unwrap();
    h.handle.retake().await.unwrap();
    h.remote.release();

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.exited);
    assert!(snapshot.ocr.is_none());
    assert!(snapshot.outcome.is_none());
    assert!(!snapshot.camera_active);
    assert_eq!(h.count(|e| *e == PresentationEvent::ExitRequested), 1);
    assert_eq!(h.count(|e| *e == PresentationEvent::RetryRequested), 0);
    assert!(!h.handle.observe(FaceObservation::face(0.0, Timestamp::EPOCH)));
}

#[tokio::test]
async fn teardown_cancels_and_stops_the_loop() {
    let h = harness_aged(65);
    h.remote.stall();
    h.ready().await;
    h.hold(0);
    tokio::time::timeout(WAIT, h.remote.wait_for_call())
        .await
        .unwrap();

    h.handle.teardown().await.unwrap();
    tokio::time::timeout(WAIT, h.task).await.unwrap().unwrap();
    assert!(matches!(h.handle.snapshot().await, Err(FlowError::Closed)));
    assert!(h.sink.outcomes().is_empty());
}

#[tokio::test]
async fn shutdown_broadcast_stops_the_loop() {
    let h = harness_aged(65);
    h.shutdown.shutdown();
    tokio::time::timeout(WAIT, h.task).await.unwrap().unwrap();
    assert!(matches!(h.handle.retake().await, Err(FlowError::Closed)));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let config = FlowConfig {
        hold_duration_ms: 0,
        ..FlowConfig::default()
    };
    let collaborators = Collaborators {
        capture: Arc::new(NullCamera::new()),
        ocr: Arc::new(NullOcr::aged(65, today())),
        remote: Arc::new(NullRemoteVerifier::new()),
        clock: Arc::new(NullClock::new(NOW_MS)),
    };
    let result = VerificationFlow::spawn(
        &config,
        collaborators,
        Arc::new(RecordingSink::new()),
        ShutdownController::new().subscribe(),
    );
    assert!(matches!(result, Err(FlowError::Params(_))));
}
