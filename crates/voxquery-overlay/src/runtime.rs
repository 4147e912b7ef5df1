//! Session loop and the handle UI glue uses to drive it.
//!
//! Button presses, recognizer events and timer firings all arrive on one
//! channel and are handled strictly one at a time, in arrival order.

use std::ops::ControlFlow;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use voxquery_core::error::VoxQueryError;
use voxquery_core::SessionReport;

use crate::capability::{CapabilityFactory, RecognitionEvent};
use crate::controller::{OverlayController, OverlaySettings};
use crate::feedback::OverlayUi;

/// Everything the session loop reacts to.
#[derive(Debug)]
pub enum SessionInput {
    /// Open or close the overlay.
    Toggle,
    /// Microphone button inside the overlay.
    StartListening,
    /// Switch the recognition language by UI code.
    SetLanguage(String),
    Recognition(RecognitionEvent),
    /// The restart timer with this token elapsed.
    RestartDue(u64),
    Shutdown,
}

/// Cloneable handle used by button handlers.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    tx: UnboundedSender<SessionInput>,
}

impl OverlayHandle {
    pub fn toggle(&self) -> Result<(), VoxQueryError> {
        self.send(SessionInput::Toggle)
    }

    pub fn start_listening(&self) -> Result<(), VoxQueryError> {
        self.send(SessionInput::StartListening)
    }

    pub fn set_language(&self, code: impl Into<String>) -> Result<(), VoxQueryError> {
        self.send(SessionInput::SetLanguage(code.into()))
    }

    /// Ask the session loop to close the overlay and exit.
    pub fn shutdown(&self) -> Result<(), VoxQueryError> {
        self.send(SessionInput::Shutdown)
    }

    fn send(&self, input: SessionInput) -> Result<(), VoxQueryError> {
        self.tx
            .send(input)
            .map_err(|_| VoxQueryError::Session("Overlay session has shut down".to_string()))
    }
}

/// An overlay controller together with its input queue.
#[derive(Debug)]
pub struct OverlaySession {
    controller: OverlayController,
    rx: UnboundedReceiver<SessionInput>,
}

impl OverlaySession {
    /// Build a session and the handle that drives it.
    ///
    /// The capability factory runs immediately; a missing or failing
    /// recognizer leaves the session usable but unsupported.
    pub fn new(
        factory: CapabilityFactory,
        ui: OverlayUi,
        settings: OverlaySettings,
    ) -> (Self, OverlayHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = OverlayController::new(factory, ui, settings, tx.clone());
        (Self { controller, rx }, OverlayHandle { tx })
    }

    pub fn controller(&self) -> &OverlayController {
        &self.controller
    }

    /// Handle inputs until `Shutdown` arrives. Returns the session report.
    pub async fn run(mut self) -> SessionReport {
        tracing::info!(session_id = %self.controller.session_id(), "Overlay session loop started");

        while let Some(input) = self.rx.recv().await {
            if let ControlFlow::Break(()) = self.controller.handle(input) {
                break;
            }
        }

        let report = self.controller.report().clone();
        tracing::info!(
            session_id = %report.session_id,
            toggles = report.toggles,
            transcripts = report.transcripts,
            errors = report.total_errors(),
            "Overlay session loop finished"
        );
        report
    }
}
