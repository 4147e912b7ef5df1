use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational toast (e.g. nothing was heard).
    Info,
    /// Error toast (e.g. microphone permission denied).
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Visual state of the listening indicator.
///
/// Always set to an explicit value, never toggled, so that repeated events
/// cannot leave it out of step with the recognizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    #[default]
    Idle,
    Listening,
}

impl IndicatorState {
    pub fn is_listening(&self) -> bool {
        matches!(self, IndicatorState::Listening)
    }
}

/// Closed taxonomy of recognition failures reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionErrorKind {
    /// Microphone or service access was refused.
    PermissionDenied,
    /// The session was aborted before producing a result.
    Aborted,
    /// The recognizer heard nothing it could transcribe.
    NoSpeechDetected,
    /// Any other platform failure (network, audio capture, bad language...).
    Unsupported,
}

impl RecognitionErrorKind {
    /// Classify a platform error code.
    ///
    /// Codes follow the Web Speech API naming (`not-allowed`, `no-speech`,
    /// ...). Anything unrecognised maps to `Unsupported`.
    pub fn from_platform_code(code: &str) -> Self {
        match code.trim() {
            "not-allowed" | "service-not-allowed" => RecognitionErrorKind::PermissionDenied,
            "aborted" => RecognitionErrorKind::Aborted,
            "no-speech" => RecognitionErrorKind::NoSpeechDetected,
            _ => RecognitionErrorKind::Unsupported,
        }
    }

    /// Severity of the notification shown for this kind.
    pub fn severity(&self) -> Severity {
        match self {
            RecognitionErrorKind::PermissionDenied | RecognitionErrorKind::Unsupported => {
                Severity::Error
            }
            RecognitionErrorKind::Aborted | RecognitionErrorKind::NoSpeechDetected => {
                Severity::Info
            }
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionErrorKind::PermissionDenied => write!(f, "permission_denied"),
            RecognitionErrorKind::Aborted => write!(f, "aborted"),
            RecognitionErrorKind::NoSpeechDetected => write!(f, "no_speech_detected"),
            RecognitionErrorKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

// =============================================================================
// Session report
// =============================================================================

/// Counters collected over the lifetime of one overlay session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Whether the platform provided a recognition capability.
    pub capability_available: bool,
    /// Toggle requests, including those refused for lack of a capability.
    pub toggles: u64,
    pub opens: u64,
    pub transcripts: u64,
    pub language_switches: u64,
    /// Deferred restarts that actually issued a start.
    pub restarts: u64,
    pub permission_denied: u64,
    pub aborted: u64,
    pub no_speech: u64,
    pub unsupported: u64,
}

impl SessionReport {
    pub fn new(session_id: Uuid, capability_available: bool) -> Self {
        Self {
            session_id,
            created_at: Utc::now(),
            capability_available,
            toggles: 0,
            opens: 0,
            transcripts: 0,
            language_switches: 0,
            restarts: 0,
            permission_denied: 0,
            aborted: 0,
            no_speech: 0,
            unsupported: 0,
        }
    }

    /// Count one recognition error of the given kind.
    pub fn record_error(&mut self, kind: RecognitionErrorKind) {
        match kind {
            RecognitionErrorKind::PermissionDenied => self.permission_denied += 1,
            RecognitionErrorKind::Aborted => self.aborted += 1,
            RecognitionErrorKind::NoSpeechDetected => self.no_speech += 1,
            RecognitionErrorKind::Unsupported => self.unsupported += 1,
        }
    }

    pub fn total_errors(&self) -> u64 {
        self.permission_denied + self.aborted + self.no_speech + self.unsupported
    }
}
