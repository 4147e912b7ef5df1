//! Overlay phase state machine.
//!
//! Enforces valid transitions for the overlay lifecycle:
//! - Closed -> Idle (overlay opened)
//! - Idle -> Listening (recognizer reported start)
//! - Listening -> Idle (error or end of speech)
//! - Idle -> Closed, Listening -> Closed (overlay closed)

use std::fmt;

use voxquery_core::error::VoxQueryError;
use voxquery_core::IndicatorState;

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OverlayPhase {
    /// Overlay hidden. Recognition must not be running.
    #[default]
    Closed,
    /// Overlay visible, recognizer not capturing.
    Idle,
    /// Overlay visible, recognizer capturing audio.
    Listening,
}

impl fmt::Display for OverlayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayPhase::Closed => write!(f, "Closed"),
            OverlayPhase::Idle => write!(f, "Idle"),
            OverlayPhase::Listening => write!(f, "Listening"),
        }
    }
}

impl OverlayPhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &OverlayPhase) -> bool {
        matches!(
            (self, target),
            (OverlayPhase::Closed, OverlayPhase::Idle)
                | (OverlayPhase::Idle, OverlayPhase::Listening)
                | (OverlayPhase::Listening, OverlayPhase::Idle)
                | (OverlayPhase::Idle, OverlayPhase::Closed)
                | (OverlayPhase::Listening, OverlayPhase::Closed)
        )
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, OverlayPhase::Closed)
    }

    pub fn indicator(&self) -> IndicatorState {
        match self {
            OverlayPhase::Listening => IndicatorState::Listening,
            OverlayPhase::Closed | OverlayPhase::Idle => IndicatorState::Idle,
        }
    }
}

/// Tracks the current phase and validates every transition.
///
/// Owned by a single session; all access happens on the session loop.
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: OverlayPhase,
}

impl PhaseMachine {
    /// Create a new machine in `Closed`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OverlayPhase {
        self.phase
    }

    /// Attempt to transition to the target phase.
    ///
    /// Returns a `VoxQueryError::Session` if the transition is not allowed
    /// from the current phase; the phase is left unchanged in that case.
    pub fn transition(&mut self, target: OverlayPhase) -> Result<(), VoxQueryError> {
        if self.phase.can_transition_to(&target) {
            tracing::debug!("Overlay phase: {} -> {}", self.phase, target);
            self.phase = target;
            Ok(())
        } else {
            Err(VoxQueryError::Session(format!(
                "Invalid phase transition: {} -> {}",
                self.phase, target
            )))
        }
    }

    /// Drop back from `Listening` to `Idle`. Returns whether anything changed.
    pub fn settle(&mut self) -> bool {
        if self.phase == OverlayPhase::Listening {
            tracing::debug!("Overlay phase: Listening -> Idle");
            self.phase = OverlayPhase::Idle;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
