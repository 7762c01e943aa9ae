//! The consumer loop.
//!
//! One task owns the liveness session, the attempt state and the retry
//! controller. Everything that mutates them arrives as a message:
//! - frames and intents through the bounded mailbox ([`FlowHandle`]);
//! - finished attempts through an internal result channel;
//! - teardown through the shutdown broadcast.
//!
//! Attempts run on their own task. Their result is applied only if the
//! attempt id is still the active one; retake, exit and teardown abort the
//! task and clear the id, so a late cross-check cannot touch a new session.

use ageproof_liveness::LivenessSession;
use ageproof_verification::{
    AttemptReport, AttemptState, Collaborators, OutcomeKind, PresentationEvent, PresentationSink,
    RetainedEvidence, RetryAction, RetryController, VerificationOrchestrator,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn, Instrument};

use crate::handle::{FlowCommand, FlowHandle, FlowSnapshot};
use crate::{tracing_spans, FlowConfig, FlowError};

/// Buffer for finished attempts. At most one attempt is in flight.
const RESULT_CHANNEL_CAPACITY: usize = 4;

pub struct VerificationFlow {
    session: LivenessSession,
    attempt: AttemptState,
    retry: RetryController,
    orchestrator: Arc<VerificationOrchestrator>,
    sink: Arc<dyn PresentationSink>,
    results_tx: mpsc::Sender<AttemptReport>,
    generation: Arc<AtomicU64>,
    camera_active: Arc<AtomicBool>,
    in_flight: Option<AbortHandle>,
    /// Liveness passed while a cancelled attempt was still unwinding.
    pending_start: bool,
}

impl VerificationFlow {
    /// Validate `config`, build the flow and spawn its consumer loop.
    pub fn spawn(
        config: &FlowConfig,
        collaborators: Collaborators,
        sink: Arc<dyn PresentationSink>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(FlowHandle, JoinHandle<()>), FlowError> {
        config.validate()?;

        let (tx, commands) = mpsc::channel(config.frame_queue_capacity);
        let (results_tx, results) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let generation = Arc::new(AtomicU64::new(0));
        let camera_active = Arc::new(AtomicBool::new(false));

        let flow = Self {
            session: LivenessSession::new(config.liveness_params()),
            attempt: AttemptState::default(),
            retry: RetryController::new(),
            orchestrator: Arc::new(VerificationOrchestrator::new(
                collaborators,
                config.orchestrator_config(),
            )),
            sink,
            results_tx,
            generation: Arc::clone(&generation),
            camera_active: Arc::clone(&camera_active),
            in_flight: None,
            pending_start: false,
        };

        let span = tracing_spans::flow_span(config.minimum_age);
        let task = tokio::spawn(flow.run(commands, results, shutdown).instrument(span));
        Ok((FlowHandle::new(tx, generation, camera_active), task))
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<FlowCommand>,
        mut results: mpsc::Receiver<AttemptReport>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut shutdown_open = true;
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(FlowCommand::Teardown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(report) = results.recv() => self.finish_attempt(report),
                signal = shutdown.recv(), if shutdown_open => match signal {
                    Err(RecvError::Closed) => shutdown_open = false,
                    Ok(()) | Err(RecvError::Lagged(_)) => break,
                },
            }
        }
        self.teardown();
    }

    fn handle(&mut self, command: FlowCommand) {
        match command {
            FlowCommand::Observe {
                observation,
                generation,
            } => {
                if generation != self.session.generation() {
                    debug!(
                        frame_generation = generation,
                        current = self.session.generation(),
                        "dropping stale frame"
                    );
                    return;
                }
                if self.retry.has_exited() {
                    return;
                }
                self.session.observe(&observation);
                if self.publish_session_events() {
                    self.start_attempt(None);
                }
            }
            FlowCommand::CameraReady => {
                if self.retry.has_exited() {
                    return;
                }
                self.session.start();
                self.camera_active
                    .store(!self.session.is_verified(), Ordering::Release);
                self.publish_session_events();
            }
            FlowCommand::Retake => {
                self.cancel_in_flight();
                let action = self.retry.retake(&mut self.session, &mut self.attempt);
                self.sync_generation();
                if let RetryAction::Reset { .. } = action {
                    self.camera_active.store(true, Ordering::Release);
                    self.publish_session_events();
                    self.sink.publish(PresentationEvent::RetryRequested);
                }
            }
            FlowCommand::Exit => {
                self.cancel_in_flight();
                let action = self.retry.exit(&mut self.session, &mut self.attempt);
                self.sync_generation();
                self.camera_active.store(false, Ordering::Release);
                self.session.drain_events();
                if let RetryAction::Exited { .. } = action {
                    self.sink.publish(PresentationEvent::ExitRequested);
                }
            }
            FlowCommand::RetryVerification => self.retry_verification(),
            FlowCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            // Handled by the loop itself.
            FlowCommand::Teardown => {}
        }
    }

    /// Publish drained liveness events. Returns whether liveness just passed.
    fn publish_session_events(&mut self) -> bool {
        let mut passed = false;
        for event in self.session.drain_events() {
            for presented in PresentationEvent::from_liveness(event) {
                passed |= presented == PresentationEvent::LivenessPassed;
                self.sink.publish(presented);
            }
        }
        passed
    }

    fn start_attempt(&mut self, evidence: Option<RetainedEvidence>) {
        let Some(attempt) = self.orchestrator.begin() else {
            debug!("previous attempt still unwinding, deferring start");
            match evidence {
                Some(evidence) => self.attempt.retained = Some(evidence),
                None => self.pending_start = true,
            }
            return;
        };
        self.pending_start = false;
        let id = attempt.id();
        let resumed = evidence.is_some();
        self.attempt.begin(id);
        self.camera_active.store(false, Ordering::Release);
        info!(attempt = id, resumed, "verification attempt started");
        self.sink
            .publish(PresentationEvent::VerificationStarted { attempt_id: id });

        let orchestrator = Arc::clone(&self.orchestrator);
        let work = tokio::spawn(
            async move {
                match evidence {
                    Some(evidence) => orchestrator.resume(attempt, evidence).await,
                    None => orchestrator.execute(attempt).await,
                }
            }
            .instrument(tracing_spans::attempt_span(id, resumed)),
        );
        self.in_flight = Some(work.abort_handle());

        // Collaborator panics end the attempt as a transient error. A
        // cancelled attempt still reports, so the consumer learns the capture
        // guard is free; its id no longer matches and the report is dropped.
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let report = match work.await {
                Ok(report) => report,
                Err(e) => {
                    if e.is_panic() {
                        warn!(attempt = id, "verification attempt panicked");
                    }
                    AttemptReport::aborted(id)
                }
            };
            let _ = results.send(report).await;
        });
    }

    fn finish_attempt(&mut self, report: AttemptReport) {
        let mut report = match self.attempt.apply(report) {
            Ok(report) => report,
            Err(stale) => {
                debug!(attempt = stale.attempt_id, "dropping result of a superseded attempt");
                if self.pending_start && self.session.is_verified() {
                    self.start_attempt(None);
                }
                return;
            }
        };
        self.in_flight = None;

        if report.capture_failed {
            self.session.capture_failed();
            self.sync_generation();
            self.camera_active.store(true, Ordering::Release);
            self.publish_session_events();
        }

        let image = report.image.take();
        self.sink.publish(PresentationEvent::Outcome {
            outcome: report.outcome,
            image,
        });
    }

    fn retry_verification(&mut self) {
        let transient = self
            .attempt
            .outcome
            .as_ref()
            .is_some_and(|o| o.kind == OutcomeKind::TransientError);
        if !transient || self.attempt.active_attempt.is_some() || !self.session.is_verified() {
            debug!("nothing to retry");
            return;
        }
        let evidence = self.attempt.retained.take();
        self.start_attempt(evidence);
    }

    fn cancel_in_flight(&mut self) {
        self.pending_start = false;
        if let Some(handle) = self.in_flight.take() {
            debug!("cancelling in-flight verification");
            handle.abort();
        }
    }

    fn sync_generation(&self) {
        self.generation
            .store(self.session.generation(), Ordering::Release);
    }

    fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            session: self.session.snapshot(),
            generation: self.session.generation(),
            ocr: self.attempt.ocr.clone(),
            outcome: self.attempt.outcome.clone(),
            in_flight: self.orchestrator.is_in_flight(),
            camera_active: self.camera_active.load(Ordering::Acquire),
            exited: self.retry.has_exited(),
        }
    }

    fn teardown(&mut self) {
        self.cancel_in_flight();
        self.attempt.clear();
        self.session.reset();
        self.session.drain_events();
        self.sync_generation();
        self.camera_active.store(false, Ordering::Release);
        info!("verification flow torn down");
    }
}
