//! Recognition languages selectable from the overlay.
//!
//! Each language has a short code used by the UI buttons (`ger`, `jpn`, ...),
//! the locale tag handed to the recognizer, and the message key of its
//! display label.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::messages::MessageKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionLanguage {
    Japanese,
    German,
    #[default]
    English,
    Russian,
    Spanish,
    Swedish,
    French,
    Dutch,
    Hungarian,
    Slovenian,
}

impl RecognitionLanguage {
    pub const ALL: [RecognitionLanguage; 10] = [
        RecognitionLanguage::Japanese,
        RecognitionLanguage::German,
        RecognitionLanguage::English,
        RecognitionLanguage::Russian,
        RecognitionLanguage::Spanish,
        RecognitionLanguage::Swedish,
        RecognitionLanguage::French,
        RecognitionLanguage::Dutch,
        RecognitionLanguage::Hungarian,
        RecognitionLanguage::Slovenian,
    ];

    /// Look up a language by its UI code. Returns `None` for unsupported codes.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// Look up a language by the locale tag the recognizer uses (case-insensitive).
    pub fn from_locale_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.locale_tag().eq_ignore_ascii_case(tag))
    }

    /// Resolve a configured value that may be either a code or a locale tag.
    pub fn parse_setting(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::from_code(value).or_else(|| Self::from_locale_tag(value))
    }

    pub fn code(&self) -> &'static str {
        match self {
            RecognitionLanguage::Japanese => "jpn",
            RecognitionLanguage::German => "ger",
            RecognitionLanguage::English => "eng",
            RecognitionLanguage::Russian => "rus",
            RecognitionLanguage::Spanish => "spa",
            RecognitionLanguage::Swedish => "swe",
            RecognitionLanguage::French => "fre",
            RecognitionLanguage::Dutch => "dut",
            RecognitionLanguage::Hungarian => "hun",
            RecognitionLanguage::Slovenian => "slv",
        }
    }

    pub fn locale_tag(&self) -> &'static str {
        match self {
            RecognitionLanguage::Japanese => "ja",
            RecognitionLanguage::German => "de-DE",
            RecognitionLanguage::English => "en-US",
            RecognitionLanguage::Russian => "ru",
            RecognitionLanguage::Spanish => "es-ES",
            RecognitionLanguage::Swedish => "sv-SE",
            RecognitionLanguage::French => "fr-FR",
            RecognitionLanguage::Dutch => "nl-NL",
            RecognitionLanguage::Hungarian => "hu",
            RecognitionLanguage::Slovenian => "sl-SI",
        }
    }

    /// Message key of the label shown next to the language button.
    pub fn label_key(&self) -> MessageKey {
        MessageKey::LanguageLabel(*self)
    }
}

impl fmt::Display for RecognitionLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.locale_tag())
    }
}
