//! In-memory recognizer and UI used for testing and development without a
//! platform speech engine.

use std::sync::{Arc, Mutex};

use voxquery_core::error::VoxQueryError;
use voxquery_core::{IndicatorState, Severity};

use crate::capability::{
    CapabilityFactory, EventSink, RecognitionCapability, RecognitionEvent, RecognitionOptions,
    RecognitionResult,
};
use crate::feedback::{Notifier, OverlayUi, OverlayView};
use crate::messages::Localizer;

// =============================================================================
// Recognizer
// =============================================================================

/// A call made on the mock recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCall {
    Configure(RecognitionOptions),
    SetLanguage(String),
    Attach,
    Start,
    Stop,
    Abort,
}

#[derive(Debug, Default)]
struct MockRecognizerState {
    calls: Vec<CapabilityCall>,
    sink: Option<EventSink>,
    running: bool,
    lifecycle_events: bool,
    fail_start: bool,
}

/// Recording recognizer. Clones share state, so a test can keep one clone
/// while the session owns another.
///
/// By default it only records calls. With `with_lifecycle_events` it also
/// behaves like a browser recognizer: `start` emits `Start`, `abort` emits
/// `Error("aborted")` then `End`, and `stop` emits `End`, the last two only
/// while running.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    state: Arc<Mutex<MockRecognizerState>>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lifecycle_events() -> Self {
        let recognizer = Self::new();
        recognizer.lock().lifecycle_events = true;
        recognizer
    }

    /// Make every `start` call fail, as a platform does when already started.
    pub fn fail_start(&self, fail: bool) {
        self.lock().fail_start = fail;
    }

    pub fn calls(&self) -> Vec<CapabilityCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls equal to `call`.
    pub fn count(&self, call: &CapabilityCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Emit an event through the attached sink. Returns `false` if nothing is attached.
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        let sink = self.lock().sink.clone();
        match sink {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    /// Simulate one utterance: a final result followed by end of speech.
    pub fn say(&self, transcript: &str) -> bool {
        self.emit(RecognitionEvent::Result(vec![RecognitionResult::single(
            transcript, 0.92,
        )])) && self.emit(RecognitionEvent::SpeechEnd)
    }

    /// A factory handing the session a clone of this recognizer.
    pub fn factory(&self) -> CapabilityFactory {
        let recognizer = self.clone();
        Box::new(move || Ok(Some(Box::new(recognizer) as Box<dyn RecognitionCapability>)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockRecognizerState> {
        self.state.lock().expect("mock recognizer mutex poisoned")
    }
}

impl RecognitionCapability for MockRecognizer {
    fn configure(&mut self, options: &RecognitionOptions) -> Result<(), VoxQueryError> {
        self.lock().calls.push(CapabilityCall::Configure(options.clone()));
        Ok(())
    }

    fn set_language(&mut self, locale_tag: &str) -> Result<(), VoxQueryError> {
        self.lock()
            .calls
            .push(CapabilityCall::SetLanguage(locale_tag.to_string()));
        Ok(())
    }

    fn attach(&mut self, sink: EventSink) {
        let mut state = self.lock();
        state.calls.push(CapabilityCall::Attach);
        state.sink = Some(sink);
    }

    fn start(&mut self) -> Result<(), VoxQueryError> {
        let mut state = self.lock();
        state.calls.push(CapabilityCall::Start);
        if state.fail_start {
            return Err(VoxQueryError::Capability("recognition already started".into()));
        }
        if state.lifecycle_events {
            if state.running {
                return Err(VoxQueryError::Capability("recognition already started".into()));
            }
            state.running = true;
            if let Some(sink) = &state.sink {
                sink.emit(RecognitionEvent::Start);
            }
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), VoxQueryError> {
        let mut state = self.lock();
        state.calls.push(CapabilityCall::Stop);
        if state.lifecycle_events && state.running {
            state.running = false;
            if let Some(sink) = &state.sink {
                sink.emit(RecognitionEvent::End);
            }
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<(), VoxQueryError> {
        let mut state = self.lock();
        state.calls.push(CapabilityCall::Abort);
        if state.lifecycle_events && state.running {
            state.running = false;
            if let Some(sink) = &state.sink {
                sink.emit(RecognitionEvent::Error("aborted".to_string()));
                sink.emit(RecognitionEvent::End);
            }
        }
        Ok(())
    }
}

// =============================================================================
// UI
// =============================================================================

/// Everything the overlay has written to the UI so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiSnapshot {
    pub visible: bool,
    pub status: Option<String>,
    pub indicator: IndicatorState,
    pub search_text: Option<String>,
    pub language_label: Option<String>,
    pub sibling_closes: usize,
    pub notifications: Vec<(Severity, String)>,
}

/// Records every UI write. Implements both `OverlayView` and `Notifier`.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    state: Arc<Mutex<UiSnapshot>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UiSnapshot {
        self.lock().clone()
    }

    /// Bundle this recorder with a localizer into session collaborators.
    pub fn overlay_ui(&self, localizer: impl Localizer + 'static) -> OverlayUi {
        OverlayUi::new(
            Box::new(localizer),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UiSnapshot> {
        self.state.lock().expect("recording ui mutex poisoned")
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, severity: Severity, message: &str) {
        self.lock().notifications.push((severity, message.to_string()));
    }
}

impl OverlayView for RecordingUi {
    fn set_overlay_visible(&mut self, visible: bool) {
        self.lock().visible = visible;
    }

    fn close_sibling_overlays(&mut self) {
        self.lock().sibling_closes += 1;
    }

    fn set_status(&mut self, text: &str) {
        self.lock().status = Some(text.to_string());
    }

    fn set_indicator(&mut self, state: IndicatorState) {
        self.lock().indicator = state;
    }

    fn set_search_text(&mut self, text: &str) {
        self.lock().search_text = Some(text.to_string());
    }

    fn set_language_label(&mut self, label: &str) {
        self.lock().language_label = Some(label.to_string());
    }
}
