//! VoxQuery overlay crate - voice input overlay for a search field.
//!
//! Drives a platform speech recognizer from an overlay panel: the overlay is
//! toggled open and closed, the recognizer is configured lazily on first open,
//! its events become status feedback and search text, and the recognition
//! language can be switched at any time. All inputs are serialized through a
//! single session loop.

pub mod capability;
pub mod controller;
pub mod feedback;
pub mod language;
pub mod messages;
pub mod mock;
pub mod runtime;
pub mod state;
pub mod timer;

pub use capability::{
    CapabilityFactory, EventSink, RecognitionAlternative, RecognitionCapability, RecognitionEvent,
    RecognitionOptions, RecognitionResult,
};
pub use controller::{OverlayController, OverlaySettings};
pub use feedback::{Notifier, OverlayUi, OverlayView};
pub use language::RecognitionLanguage;
pub use messages::{Localizer, MessageCatalog, MessageKey};
pub use runtime::{OverlayHandle, OverlaySession, SessionInput};
pub use state::OverlayPhase;
