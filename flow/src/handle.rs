//! The producer side of a flow: camera frames and user intents.

use ageproof_liveness::SessionSnapshot;
use ageproof_types::FaceObservation;
use ageproof_verification::{OcrResult, VerificationOutcome};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use crate::FlowError;

/// Messages accepted by the consumer loop.
#[derive(Debug)]
pub enum FlowCommand {
    /// A camera frame, stamped with the session generation it was sent under.
    Observe {
        observation: FaceObservation,
        generation: u64,
    },
    /// The camera finished initialising; classification is now meaningful.
    CameraReady,
    /// Discard the attempt and hold again.
    Retake,
    /// Abandon the flow.
    Exit,
    /// Re-run verification after a transient failure.
    RetryVerification,
    Snapshot(oneshot::Sender<FlowSnapshot>),
    /// Cancel everything and stop the consumer loop.
    Teardown,
}

/// Point-in-time view of a flow, for hosts and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub session: SessionSnapshot,
    pub generation: u64,
    pub ocr: Option<OcrResult>,
    pub outcome: Option<VerificationOutcome>,
    pub in_flight: bool,
    pub camera_active: bool,
    pub exited: bool,
}

/// Cloneable handle given to the camera source and the presentation layer.
#[derive(Clone)]
pub struct FlowHandle {
    tx: mpsc::Sender<FlowCommand>,
    generation: Arc<AtomicU64>,
    camera_active: Arc<AtomicBool>,
}

impl FlowHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<FlowCommand>,
        generation: Arc<AtomicU64>,
        camera_active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            tx,
            generation,
            camera_active,
        }
    }

    /// Whether the camera should be delivering frames. Cleared while the
    /// camera is handed to document capture.
    pub fn is_active(&self) -> bool {
        self.camera_active.load(Ordering::Acquire)
    }

    /// Offer one frame. Never blocks: returns `false` when the frame was
    /// dropped because the camera is inactive or the mailbox is full.
    pub fn observe(&self, observation: FaceObservation) -> bool {
        if !self.is_active() {
            return false;
        }
        let generation = self.generation.load(Ordering::Acquire);
        match self.tx.try_send(FlowCommand::Observe {
            observation,
            generation,
        }) {
            Ok(()) => true,
            Err(e) => {
                trace!(error = %e, "dropping frame");
                false
            }
        }
    }

    pub async fn camera_ready(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::CameraReady).await
    }

    pub async fn retake(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Retake).await
    }

    pub async fn exit(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Exit).await
    }

    pub async fn retry_verification(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::RetryVerification).await
    }

    pub async fn teardown(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Teardown).await
    }

    pub async fn snapshot(&self) -> Result<FlowSnapshot, FlowError> {
        let (tx, rx) = oneshot::channel();
        self.send(FlowCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| FlowError::Closed)
    }

    async fn send(&self, command: FlowCommand) -> Result<(), FlowError> {
        self.tx.send(command).await.map_err(|_| FlowError::Closed)
    }
}
