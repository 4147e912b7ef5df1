//! Symbolic message keys and the localization contract.

use std::collections::HashMap;

use voxquery_core::RecognitionErrorKind;

use crate::language::RecognitionLanguage;

/// Every string the overlay asks the localization provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Listening,
    NotListening,
    /// Shown when the platform has no speech recognition at all.
    Unsupported,
    PermissionDenied,
    Aborted,
    NoSpeech,
    /// Any other recognition failure.
    RecognitionFailed,
    LanguageLabel(RecognitionLanguage),
}

impl MessageKey {
    /// The lookup key passed to the `Localizer`.
    pub fn as_key(&self) -> &'static str {
        match self {
            MessageKey::Listening => "Listening...",
            MessageKey::NotListening => "Not listening",
            MessageKey::Unsupported => "Speech recognition is not supported by your browser",
            MessageKey::PermissionDenied => "Microphone permission was denied",
            MessageKey::Aborted => "Speech recognition aborted",
            MessageKey::NoSpeech => "No speech detected",
            MessageKey::RecognitionFailed => "Speech recognition failed",
            MessageKey::LanguageLabel(lang) => match lang {
                RecognitionLanguage::Japanese => "Japanese",
                RecognitionLanguage::German => "German",
                RecognitionLanguage::English => "English",
                RecognitionLanguage::Russian => "Russian",
                RecognitionLanguage::Spanish => "Spanish",
                RecognitionLanguage::Swedish => "Swedish",
                RecognitionLanguage::French => "French",
                RecognitionLanguage::Dutch => "Dutch",
                RecognitionLanguage::Hungarian => "Hungarian",
                RecognitionLanguage::Slovenian => "Slovenian",
            },
        }
    }

    /// Notification text for a recognition failure.
    pub fn for_error(kind: RecognitionErrorKind) -> Self {
        match kind {
            RecognitionErrorKind::PermissionDenied => MessageKey::PermissionDenied,
            RecognitionErrorKind::Aborted => MessageKey::Aborted,
            RecognitionErrorKind::NoSpeechDetected => MessageKey::NoSpeech,
            RecognitionErrorKind::Unsupported => MessageKey::RecognitionFailed,
        }
    }
}

/// Resolves message keys to display strings.
pub trait Localizer: Send {
    fn resolve(&self, key: &str) -> String;

    fn message(&self, key: MessageKey) -> String {
        self.resolve(key.as_key())
    }
}

/// Table-backed localizer.
///
/// Keys are English source strings, so an empty catalog already yields
/// readable English. Missing keys resolve to themselves.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl Localizer for MessageCatalog {
    fn resolve(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
