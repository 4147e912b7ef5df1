//! Contract of the platform speech recognizer.
//!
//! The recognizer itself lives outside this crate. The overlay only drives it
//! through `RecognitionCapability` and hears back through an `EventSink`.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use voxquery_core::error::VoxQueryError;

use crate::runtime::SessionInput;

// =============================================================================
// Options
// =============================================================================

/// Settings applied to the recognizer during setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionOptions {
    /// Locale tag, e.g. `en-US`.
    pub language: String,
    /// Keep listening after the first utterance.
    pub continuous: bool,
    /// Report partial transcripts while the user is still speaking.
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl RecognitionOptions {
    /// One final transcript per activation, best alternative only.
    pub fn single_utterance(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            continuous: false,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// One candidate transcript for an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// All candidates for one utterance, best first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub alternatives: Vec<RecognitionAlternative>,
}

impl RecognitionResult {
    pub fn single(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence,
            }],
        }
    }
}

/// Lifecycle events emitted by the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Audio capture began.
    Start,
    /// Final results for the utterance.
    Result(Vec<RecognitionResult>),
    /// A failure, carrying the platform's error code (`not-allowed`, `no-speech`, ...).
    Error(String),
    /// The user stopped speaking.
    SpeechEnd,
    /// The recognizer session is fully torn down.
    End,
}

impl RecognitionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RecognitionEvent::Start => "start",
            RecognitionEvent::Result(_) => "result",
            RecognitionEvent::Error(_) => "error",
            RecognitionEvent::SpeechEnd => "speech_end",
            RecognitionEvent::End => "end",
        }
    }
}

/// Delivers recognizer events to the one session that owns the recognizer.
///
/// Events are queued on the session's input channel and handled in emission
/// order, one at a time.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<SessionInput>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<SessionInput>) -> Self {
        Self { tx }
    }

    /// Queue an event. Returns `false` once the session has shut down.
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        self.tx.send(SessionInput::Recognition(event)).is_ok()
    }
}

// =============================================================================
// Trait
// =============================================================================

/// A platform speech recognizer.
///
/// `stop` and `abort` must be safe to call when nothing is running.
pub trait RecognitionCapability: Send {
    /// Apply the full option set.
    fn configure(&mut self, options: &RecognitionOptions) -> Result<(), VoxQueryError>;

    /// Change the recognition language for subsequent sessions.
    fn set_language(&mut self, locale_tag: &str) -> Result<(), VoxQueryError>;

    /// Register where events should be delivered. Called once per session.
    fn attach(&mut self, sink: EventSink);

    fn start(&mut self) -> Result<(), VoxQueryError>;

    /// Stop listening and deliver any pending result.
    fn stop(&mut self) -> Result<(), VoxQueryError>;

    /// Stop listening and discard any pending result.
    fn abort(&mut self) -> Result<(), VoxQueryError>;
}

/// Produces the recognizer at session construction.
///
/// `Ok(None)` means the platform has no recognizer; an `Err` means creating
/// one failed. Both leave the session without a capability.
pub type CapabilityFactory =
    Box<dyn FnOnce() -> Result<Option<Box<dyn RecognitionCapability>>, VoxQueryError> + Send>;
