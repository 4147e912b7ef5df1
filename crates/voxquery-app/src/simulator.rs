//! Simulated speech recognizer for running the overlay in a terminal.
//!
//! `SimulatedRecognizer` is handed to the session as its capability;
//! `Microphone` stays with the REPL and plays the part of the user's voice.

use std::sync::{Arc, Mutex, MutexGuard};

use voxquery_core::error::VoxQueryError;
use voxquery_overlay::{
    EventSink, RecognitionCapability, RecognitionEvent, RecognitionOptions, RecognitionResult,
};

#[derive(Debug, Default)]
struct Shared {
    sink: Option<EventSink>,
    running: bool,
    language: String,
}

pub struct SimulatedRecognizer {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Clone)]
pub struct Microphone {
    shared: Arc<Mutex<Shared>>,
}

/// Create a recognizer and the microphone that feeds it.
pub fn simulated_pair() -> (SimulatedRecognizer, Microphone) {
    let shared = Arc::new(Mutex::new(Shared::default()));
    (
        SimulatedRecognizer {
            shared: Arc::clone(&shared),
        },
        Microphone { shared },
    )
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().expect("simulator mutex poisoned")
}

impl RecognitionCapability for SimulatedRecognizer {
    fn configure(&mut self, options: &RecognitionOptions) -> Result<(), VoxQueryError> {
        tracing::debug!(
            language = %options.language,
            continuous = options.continuous,
            interim_results = options.interim_results,
            max_alternatives = options.max_alternatives,
            "Simulator configured"
        );
        lock(&self.shared).language = options.language.clone();
        Ok(())
    }

    fn set_language(&mut self, locale_tag: &str) -> Result<(), VoxQueryError> {
        lock(&self.shared).language = locale_tag.to_string();
        Ok(())
    }

    fn attach(&mut self, sink: EventSink) {
        lock(&self.shared).sink = Some(sink);
    }

    fn start(&mut self) -> Result<(), VoxQueryError> {
        let mut shared = lock(&self.shared);
        if shared.running {
            return Err(VoxQueryError::Capability("recognition already started".into()));
        }
        shared.running = true;
        tracing::debug!(language = %shared.language, "Simulator listening");
        if let Some(sink) = &shared.sink {
            sink.emit(RecognitionEvent::Start);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), VoxQueryError> {
        let mut shared = lock(&self.shared);
        if shared.running {
            shared.running = false;
            if let Some(sink) = &shared.sink {
                sink.emit(RecognitionEvent::End);
            }
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<(), VoxQueryError> {
        let mut shared = lock(&self.shared);
        if shared.running {
            shared.running = false;
            if let Some(sink) = &shared.sink {
                sink.emit(RecognitionEvent::Error("aborted".to_string()));
                sink.emit(RecognitionEvent::End);
            }
        }
        Ok(())
    }
}

impl Microphone {
    /// Speak a phrase. Returns `false` if the recognizer is not listening.
    pub fn say(&self, text: &str) -> bool {
        let shared = lock(&self.shared);
        let Some(sink) = shared.sink.as_ref().filter(|_| shared.running) else {
            return false;
        };
        sink.emit(RecognitionEvent::Result(vec![RecognitionResult::single(text, 0.9)]));
        sink.emit(RecognitionEvent::SpeechEnd);
        true
    }

    /// Fail the running recognition with a platform error code.
    pub fn fail(&self, code: &str) -> bool {
        let mut shared = lock(&self.shared);
        if !shared.running {
            return false;
        }
        shared.running = false;
        if let Some(sink) = &shared.sink {
            sink.emit(RecognitionEvent::Error(code.to_string()));
            sink.emit(RecognitionEvent::End);
        }
        true
    }
}
