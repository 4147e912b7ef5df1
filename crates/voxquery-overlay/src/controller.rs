//! Voice overlay controller.
//!
//! The `OverlayController` owns the platform recognizer for one page or view.
//! It opens and closes the overlay, configures the recognizer on first open,
//! turns recognizer events into status feedback and search text, and restarts
//! recognition when the user picks another language.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use voxquery_core::config::{RestartStrategy, VoxQueryConfig};
use voxquery_core::error::VoxQueryError;
use voxquery_core::{IndicatorState, RecognitionErrorKind, SessionReport, Severity};

use crate::capability::{
    CapabilityFactory, EventSink, RecognitionCapability, RecognitionEvent, RecognitionOptions,
    RecognitionResult,
};
use crate::feedback::OverlayUi;
use crate::language::RecognitionLanguage;
use crate::messages::MessageKey;
use crate::runtime::SessionInput;
use crate::state::{OverlayPhase, PhaseMachine};
use crate::timer::RestartTimer;

/// Runtime settings for one overlay session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySettings {
    /// Language used at setup until the user picks another one.
    pub language: RecognitionLanguage,
    pub restart_delay: Duration,
    pub restart_strategy: RestartStrategy,
    pub listen_on_open: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            language: RecognitionLanguage::English,
            restart_delay: Duration::from_millis(400),
            restart_strategy: RestartStrategy::Delay,
            listen_on_open: false,
        }
    }
}

impl OverlaySettings {
    /// Derive settings from the loaded configuration.
    ///
    /// An unknown default language falls back to English with a warning.
    pub fn from_config(config: &VoxQueryConfig) -> Self {
        let configured = &config.recognition.default_language;
        let language = RecognitionLanguage::parse_setting(configured).unwrap_or_else(|| {
            tracing::warn!(
                language = %configured,
                "Unknown default recognition language, using en-US"
            );
            RecognitionLanguage::English
        });

        Self {
            language,
            restart_delay: Duration::from_millis(config.recognition.restart_delay_ms),
            restart_strategy: config.recognition.restart_strategy,
            listen_on_open: config.overlay.listen_on_open,
        }
    }
}

pub struct OverlayController {
    session_id: Uuid,
    /// Set once at construction, never replaced.
    capability: Option<Box<dyn RecognitionCapability>>,
    /// Whether options and event delivery have been installed on the recognizer.
    initialized: bool,
    phase: PhaseMachine,
    language: RecognitionLanguage,
    settings: OverlaySettings,
    ui: OverlayUi,
    restart: RestartTimer,
    /// With `RestartStrategy::AwaitEnd`, the pending restart may fire early on `End`.
    restart_on_end: bool,
    inputs: UnboundedSender<SessionInput>,
    report: SessionReport,
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("session_id", &self.session_id)
            .field("has_capability", &self.capability.is_some())
            .field("initialized", &self.initialized)
            .field("phase", &self.phase.current())
            .field("language", &self.language)
            .field("restart", &self.restart)
            .finish()
    }
}

impl OverlayController {
    /// Create a controller, obtaining the recognizer from `factory`.
    ///
    /// `inputs` is the session's input channel: the recognizer's events and
    /// the restart timer report back through it.
    pub fn new(
        factory: CapabilityFactory,
        ui: OverlayUi,
        settings: OverlaySettings,
        inputs: UnboundedSender<SessionInput>,
    ) -> Self {
        let session_id = Uuid::new_v4();

        let capability = match factory() {
            Ok(Some(capability)) => {
                tracing::info!(%session_id, "Speech recognition capability acquired");
                Some(capability)
            }
            Ok(None) => {
                tracing::warn!(
                    %session_id,
                    error = %VoxQueryError::CapabilityUnavailable,
                    "Speech recognition is not available on this platform"
                );
                None
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "Failed to create speech recognition capability");
                None
            }
        };

        let report = SessionReport::new(session_id, capability.is_some());

        Self {
            session_id,
            capability,
            initialized: false,
            phase: PhaseMachine::new(),
            language: settings.language,
            restart: RestartTimer::new(settings.restart_delay),
            restart_on_end: false,
            settings,
            ui,
            inputs,
            report,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn has_capability(&self) -> bool {
        self.capability.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_visible(&self) -> bool {
        self.phase.current().is_visible()
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase.current()
    }

    pub fn indicator(&self) -> IndicatorState {
        self.phase.current().indicator()
    }

    pub fn language(&self) -> RecognitionLanguage {
        self.language
    }

    pub fn restart_pending(&self) -> bool {
        self.restart.is_pending()
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Handle one session input. Breaks on `Shutdown`.
    pub fn handle(&mut self, input: SessionInput) -> ControlFlow<()> {
        match input {
            SessionInput::Toggle => self.toggle(),
            SessionInput::StartListening => {
                self.start_listening();
            }
            SessionInput::SetLanguage(code) => self.set_language(&code),
            SessionInput::Recognition(event) => self.on_recognition_event(event),
            SessionInput::RestartDue(token) => self.on_restart_due(token),
            SessionInput::Shutdown => {
                self.shutdown();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Open the overlay if closed, close it if open.
    ///
    /// Without a recognizer this only shows the "unsupported" notification.
    pub fn toggle(&mut self) {
        self.report.toggles += 1;

        if self.refuse_without_capability("Toggle") {
            return;
        }

        if self.is_visible() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Start recognition from the overlay's microphone control.
    ///
    /// Only acts when the overlay is open, set up, and not already listening.
    /// Without a recognizer this only shows the "unsupported" notification.
    /// Returns whether `start` was issued to the recognizer.
    pub fn start_listening(&mut self) -> bool {
        if self.refuse_without_capability("Start") {
            return false;
        }
        if self.phase.current() != OverlayPhase::Idle || !self.initialized {
            tracing::debug!(
                phase = %self.phase.current(),
                initialized = self.initialized,
                "Start ignored: overlay not ready"
            );
            return false;
        }

        let Some(capability) = self.capability.as_mut() else {
            return false;
        };

        match capability.start() {
            Ok(()) => {
                tracing::debug!(language = %self.language, "Recognition start requested");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recognition start failed");
                false
            }
        }
    }

    /// Switch the recognition language by UI code (`ger`, `jpn`, ...).
    ///
    /// Unsupported codes are ignored. Without a recognizer this only shows the
    /// "unsupported" notification. Otherwise any running recognition is
    /// aborted, the language and its label are updated, and recognition is
    /// restarted once the restart timer fires.
    pub fn set_language(&mut self, code: &str) {
        let Some(language) = RecognitionLanguage::from_code(code) else {
            tracing::debug!(code, "Ignoring unsupported recognition language");
            return;
        };
        if self.refuse_without_capability("Language switch") {
            return;
        }

        self.report.language_switches += 1;
        self.restart.cancel();
        self.restart_on_end = false;

        if let Some(capability) = self.capability.as_mut() {
            if let Err(e) = capability.abort() {
                tracing::warn!(error = %e, "Abort before language switch failed");
            }
        }
        if self.phase.settle() {
            self.ui.show_indicator(IndicatorState::Idle);
        }

        self.language = language;
        if let Some(capability) = self.capability.as_mut() {
            if let Err(e) = capability.set_language(language.locale_tag()) {
                tracing::warn!(error = %e, language = %language, "Failed to set recognition language");
            }
        }

        let label = self.ui.localizer.message(language.label_key());
        self.ui.view.set_language_label(&label);
        tracing::info!(session_id = %self.session_id, language = %language, "Recognition language switched");

        match self.restart.schedule(&self.inputs) {
            Ok(token) => {
                tracing::debug!(
                    token,
                    delay_ms = self.restart.delay().as_millis() as u64,
                    "Recognition restart scheduled"
                );
                self.restart_on_end = self.settings.restart_strategy == RestartStrategy::AwaitEnd;
            }
            Err(e) => tracing::warn!(error = %e, "Could not schedule recognition restart"),
        }
    }

    /// Emit the "unsupported" notification when there is no recognizer.
    /// Returns whether the operation must stop here.
    fn refuse_without_capability(&self, operation: &str) -> bool {
        if self.capability.is_some() {
            return false;
        }
        tracing::debug!(
            session_id = %self.session_id,
            operation,
            error = %VoxQueryError::CapabilityUnavailable,
            "Operation refused"
        );
        self.ui.notify(Severity::Error, MessageKey::Unsupported);
        true
    }

    /// Close the overlay if open and cancel anything pending.
    pub fn shutdown(&mut self) {
        if self.is_visible() {
            self.close();
        }
        self.restart.cancel();
        self.restart_on_end = false;
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    fn open(&mut self) {
        if let Err(e) = self.phase.transition(OverlayPhase::Idle) {
            tracing::warn!(error = %e, "Cannot open overlay");
            return;
        }
        self.report.opens += 1;
        self.ui.view.close_sibling_overlays();
        self.ui.view.set_overlay_visible(true);
        tracing::debug!(session_id = %self.session_id, "Overlay opened");

        if !self.initialized {
            self.setup();
        }
        if self.settings.listen_on_open {
            self.start_listening();
        }
    }

    fn close(&mut self) {
        self.restart.cancel();
        self.restart_on_end = false;

        if let Err(e) = self.phase.transition(OverlayPhase::Closed) {
            tracing::warn!(error = %e, "Cannot close overlay");
            return;
        }
        self.ui.view.set_overlay_visible(false);
        self.cancel_recognition();
        self.ui.show_indicator(IndicatorState::Idle);
        tracing::debug!(session_id = %self.session_id, "Overlay closed");
    }

    /// Configure the recognizer and attach event delivery. Runs once.
    fn setup(&mut self) {
        if self.initialized {
            return;
        }
        let Some(capability) = self.capability.as_mut() else {
            return;
        };

        capability.attach(EventSink::new(self.inputs.clone()));
        let options = RecognitionOptions::single_utterance(self.language.locale_tag());
        if let Err(e) = capability.configure(&options) {
            tracing::warn!(error = %e, "Failed to configure recognition capability");
        }
        self.initialized = true;
        tracing::info!(
            session_id = %self.session_id,
            language = %self.language,
            "Recognition capability set up"
        );
    }

    /// Abort then stop, whatever the recognizer is doing.
    fn cancel_recognition(&mut self) {
        let Some(capability) = self.capability.as_mut() else {
            return;
        };
        if let Err(e) = capability.abort() {
            tracing::warn!(error = %e, "Recognition abort failed");
        }
        if let Err(e) = capability.stop() {
            tracing::warn!(error = %e, "Recognition stop failed");
        }
    }

    // =========================================================================
    // Recognizer events
    // =========================================================================

    fn on_recognition_event(&mut self, event: RecognitionEvent) {
        tracing::trace!(event = event.name(), phase = %self.phase.current(), "Recognition event");
        match event {
            RecognitionEvent::Start => self.on_start(),
            RecognitionEvent::Result(results) => self.on_result(&results),
            RecognitionEvent::Error(code) => self.on_error(&code),
            RecognitionEvent::SpeechEnd => self.on_speech_end(),
            RecognitionEvent::End => self.on_end(),
        }
    }

    fn on_start(&mut self) {
        match self.phase.current() {
            OverlayPhase::Closed => {
                tracing::warn!("Recognition started while overlay is closed, cancelling");
                self.cancel_recognition();
                return;
            }
            OverlayPhase::Idle => {
                if let Err(e) = self.phase.transition(OverlayPhase::Listening) {
                    tracing::warn!(error = %e, "Unexpected phase on recognition start");
                }
            }
            OverlayPhase::Listening => {}
        }
        self.ui.show_indicator(IndicatorState::Listening);
        tracing::info!(language = %self.language, "Listening");
    }

    fn on_error(&mut self, code: &str) {
        let kind = RecognitionErrorKind::from_platform_code(code);
        self.report.record_error(kind);
        tracing::info!(code, kind = %kind, "Recognition error");

        self.ui.notify(kind.severity(), MessageKey::for_error(kind));
        self.phase.settle();
        self.ui.show_indicator(IndicatorState::Idle);
    }

    fn on_speech_end(&mut self) {
        if let Some(capability) = self.capability.as_mut() {
            if let Err(e) = capability.stop() {
                tracing::warn!(error = %e, "Recognition stop after speech end failed");
            }
        }
        self.phase.settle();
        self.ui.show_indicator(IndicatorState::Idle);
    }

    fn on_result(&mut self, results: &[RecognitionResult]) {
        if !self.is_visible() {
            tracing::debug!("Dropping recognition result: overlay is closed");
            return;
        }

        let best = results.first().and_then(|result| result.alternatives.first());
        match best {
            Some(alternative) => {
                self.ui.view.set_search_text(&alternative.transcript);
                self.report.transcripts += 1;
                tracing::info!(
                    chars = alternative.transcript.chars().count(),
                    confidence = alternative.confidence,
                    "Transcript written to search field"
                );
            }
            None => tracing::debug!("Recognition result carried no alternatives"),
        }
    }

    fn on_end(&mut self) {
        if self.phase.settle() {
            self.ui.show_indicator(IndicatorState::Idle);
        }
        if self.restart_on_end {
            if let Some(token) = self.restart.pending_token() {
                tracing::debug!(token, "Recognizer ended, restarting early");
                self.on_restart_due(token);
            }
        }
    }

    fn on_restart_due(&mut self, token: u64) {
        if !self.restart.claim(token) {
            tracing::debug!(token, "Ignoring stale restart");
            return;
        }
        self.restart_on_end = false;

        if !self.is_visible() {
            tracing::debug!(token, "Skipping restart: overlay is closed");
            return;
        }
        if self.start_listening() {
            self.report.restarts += 1;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageCatalog;
    use crate::mock::{CapabilityCall, MockRecognizer, RecordingUi};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn controller_with(
        recognizer: &MockRecognizer,
        ui: &RecordingUi,
        settings: OverlaySettings,
    ) -> (OverlayController, UnboundedReceiver<SessionInput>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = OverlayController::new(
            recognizer.factory(),
            ui.overlay_ui(MessageCatalog::new()),
            settings,
            tx,
        );
        (controller, rx)
    }

    fn unsupported_controller(ui: &RecordingUi) -> OverlayController {
        let (tx, _rx) = mpsc::unbounded_channel();
        OverlayController::new(
            Box::new(|| Ok(None)),
            ui.overlay_ui(MessageCatalog::new()),
            OverlaySettings::default(),
            tx,
        )
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = VoxQueryConfig::default();
        config.recognition.default_language = "ger".to_string();
        config.recognition.restart_delay_ms = 250;
        config.recognition.restart_strategy = RestartStrategy::AwaitEnd;
        config.overlay.listen_on_open = true;

        let settings = OverlaySettings::from_config(&config);
        assert_eq!(settings.language, RecognitionLanguage::German);
        assert_eq!(settings.restart_delay, Duration::from_millis(250));
        assert_eq!(settings.restart_strategy, RestartStrategy::AwaitEnd);
        assert!(settings.listen_on_open);
    }

    #[test]
    fn test_settings_unknown_language_falls_back() {
        let mut config = VoxQueryConfig::default();
        config.recognition.default_language = "tlh".to_string();
        let settings = OverlaySettings::from_config(&config);
        assert_eq!(settings.language, RecognitionLanguage::English);
    }

    #[test]
    fn test_new_controller_state() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        assert!(controller.has_capability());
        assert!(!controller.is_initialized());
        assert!(!controller.is_visible());
        assert_eq!(controller.language(), RecognitionLanguage::English);
        assert!(recognizer.calls().is_empty());
    }

    #[test]
    fn test_factory_error_leaves_no_capability() {
        let ui = RecordingUi::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut controller = OverlayController::new(
            Box::new(|| Err(VoxQueryError::Capability("constructor threw".into()))),
            ui.overlay_ui(MessageCatalog::new()),
            OverlaySettings::default(),
            tx,
        );

        assert!(!controller.has_capability());
        assert!(!controller.report().capability_available);

        controller.toggle();
        assert!(!controller.is_visible());
        assert!(!controller.is_initialized());
        assert_eq!(ui.snapshot().notifications.len(), 1);
    }

    #[test]
    fn test_toggle_without_capability_notifies_each_time() {
        let ui = RecordingUi::new();
        let mut controller = unsupported_controller(&ui);

        for expected in 1..=3 {
            controller.toggle();
            assert!(!controller.is_visible());

            let snapshot = ui.snapshot();
            assert_eq!(snapshot.notifications.len(), expected);
            let (severity, message) = snapshot.notifications.last().unwrap();
            assert_eq!(*severity, Severity::Error);
            assert_eq!(message, MessageKey::Unsupported.as_key());
            assert_eq!(snapshot.sibling_closes, 0);
            assert!(!snapshot.visible);
        }
        assert_eq!(controller.report().toggles, 3);
        assert_eq!(controller.report().opens, 0);
    }

    #[test]
    fn test_first_open_runs_setup() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        controller.toggle();

        assert!(controller.is_visible());
        assert!(controller.is_initialized());
        assert_eq!(
            recognizer.calls(),
            vec![
                CapabilityCall::Attach,
                CapabilityCall::Configure(RecognitionOptions::single_utterance("en-US")),
            ]
        );
        let snapshot = ui.snapshot();
        assert!(snapshot.visible);
        assert_eq!(snapshot.sibling_closes, 1);
        assert!(snapshot.notifications.is_empty());
    }

    #[test]
    fn test_setup_uses_configured_language() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let settings = OverlaySettings {
            language: RecognitionLanguage::Swedish,
            ..OverlaySettings::default()
        };
        let (mut controller, _rx) = controller_with(&recognizer, &ui, settings);

        controller.toggle();
        assert!(recognizer
            .calls()
            .contains(&CapabilityCall::Configure(RecognitionOptions::single_utterance("sv-SE"))));
    }

    #[test]
    fn test_close_aborts_then_stops() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        controller.toggle();
        controller.toggle();

        assert!(!controller.is_visible());
        let calls = recognizer.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[CapabilityCall::Abort, CapabilityCall::Stop]
        );
        let snapshot = ui.snapshot();
        assert!(!snapshot.visible);
        assert_eq!(snapshot.indicator, IndicatorState::Idle);
        assert_eq!(snapshot.status.as_deref(), Some("Not listening"));
    }

    #[test]
    fn test_setup_runs_once_across_toggles() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        for _ in 0..7 {
            controller.toggle();
        }

        assert!(controller.is_visible());
        assert_eq!(recognizer.count(&CapabilityCall::Attach), 1);
        assert_eq!(
            recognizer
                .calls()
                .iter()
                .filter(|c| matches!(c, CapabilityCall::Configure(_)))
                .count(),
            1
        );
        assert_eq!(controller.report().opens, 4);
    }

    #[test]
    fn test_listen_on_open_starts_recognition() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let settings = OverlaySettings {
            listen_on_open: true,
            ..OverlaySettings::default()
        };
        let (mut controller, _rx) = controller_with(&recognizer, &ui, settings);

        controller.toggle();
        assert_eq!(recognizer.calls().last(), Some(&CapabilityCall::Start));
    }

    #[test]
    fn test_start_listening_requires_open_overlay() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        assert!(!controller.start_listening());
        assert_eq!(recognizer.count(&CapabilityCall::Start), 0);

        controller.toggle();
        assert!(controller.start_listening());
        assert_eq!(recognizer.count(&CapabilityCall::Start), 1);
    }

    #[test]
    fn test_start_event_sets_listening() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        controller.toggle();
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Start));

        assert_eq!(controller.phase(), OverlayPhase::Listening);
        let snapshot = ui.snapshot();
        assert_eq!(snapshot.indicator, IndicatorState::Listening);
        assert_eq!(snapshot.status.as_deref(), Some("Listening..."));
    }

    #[test]
    fn test_start_event_while_closed_cancels() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        controller.toggle();
        controller.toggle();
        let aborts = recognizer.count(&CapabilityCall::Abort);

        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Start));

        assert_eq!(controller.phase(), OverlayPhase::Closed);
        assert_eq!(recognizer.count(&CapabilityCall::Abort), aborts + 1);
        assert_eq!(ui.snapshot().indicator, IndicatorState::Idle);
    }

    #[test]
    fn test_permission_denied_while_listening() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        controller.toggle();
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Start));
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Error(
            "not-allowed".to_string(),
        )));

        let snapshot = ui.snapshot();
        assert_eq!(snapshot.indicator, IndicatorState::Idle);
        assert_eq!(snapshot.status.as_deref(), Some("Not listening"));
        assert_eq!(
            snapshot.notifications,
            vec![(
                Severity::Error,
                MessageKey::PermissionDenied.as_key().to_string()
            )]
        );
        assert_eq!(controller.phase(), OverlayPhase::Idle);
        assert_eq!(controller.report().permission_denied, 1);
    }

    #[test]
    fn test_info_severity_errors() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();

        for code in ["aborted", "no-speech"] {
            let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Error(
                code.to_string(),
            )));
        }
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Error(
            "network".to_string(),
        )));

        let severities: Vec<_> = ui
            .snapshot()
            .notifications
            .iter()
            .map(|(severity, _)| *severity)
            .collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Info, Severity::Error]);
        assert_eq!(controller.report().total_errors(), 3);
    }

    #[test]
    fn test_repeated_errors_keep_indicator_idle() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Start));

        for _ in 0..3 {
            let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Error(
                "no-speech".to_string(),
            )));
            assert_eq!(ui.snapshot().indicator, IndicatorState::Idle);
            assert_eq!(controller.indicator(), IndicatorState::Idle);
        }
    }

    #[test]
    fn test_speech_end_stops_and_resets() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Start));
        let stops = recognizer.count(&CapabilityCall::Stop);

        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::SpeechEnd));

        assert_eq!(recognizer.count(&CapabilityCall::Stop), stops + 1);
        assert_eq!(controller.phase(), OverlayPhase::Idle);
        let snapshot = ui.snapshot();
        assert_eq!(snapshot.indicator, IndicatorState::Idle);
        assert_eq!(snapshot.status.as_deref(), Some("Not listening"));
    }

    #[test]
    fn test_result_written_verbatim() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();

        let results = vec![
            RecognitionResult {
                alternatives: vec![
                    crate::capability::RecognitionAlternative {
                        transcript: " search term ".to_string(),
                        confidence: 0.9,
                    },
                    crate::capability::RecognitionAlternative {
                        transcript: "church term".to_string(),
                        confidence: 0.2,
                    },
                ],
            },
            RecognitionResult::single("ignored", 0.5),
        ];
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Result(results)));

        assert_eq!(ui.snapshot().search_text.as_deref(), Some(" search term "));
        assert_eq!(controller.report().transcripts, 1);
    }

    #[test]
    fn test_empty_result_leaves_field_untouched() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();

        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Result(vec![])));
        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Result(vec![
            RecognitionResult::default(),
        ])));

        assert_eq!(ui.snapshot().search_text, None);
        assert_eq!(controller.report().transcripts, 0);
    }

    #[test]
    fn test_result_while_closed_is_dropped() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        let _ = controller.handle(SessionInput::Recognition(RecognitionEvent::Result(vec![
            RecognitionResult::single("late", 1.0),
        ])));
        assert_eq!(ui.snapshot().search_text, None);
    }

    #[tokio::test]
    async fn test_set_language_updates_language_and_label() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();

        controller.set_language("ger");

        assert_eq!(controller.language().locale_tag(), "de-DE");
        assert_eq!(ui.snapshot().language_label.as_deref(), Some("German"));
        let calls = recognizer.calls();
        assert!(calls.contains(&CapabilityCall::Abort));
        assert!(calls.contains(&CapabilityCall::SetLanguage("de-DE".to_string())));
        assert!(controller.restart_pending());
    }

    #[tokio::test]
    async fn test_set_language_label_is_localized() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut controller = OverlayController::new(
            recognizer.factory(),
            ui.overlay_ui(MessageCatalog::new().with_entry("German", "Deutsch")),
            OverlaySettings::default(),
            tx,
        );

        controller.set_language("ger");
        assert_eq!(ui.snapshot().language_label.as_deref(), Some("Deutsch"));
    }

    #[test]
    fn test_set_language_unsupported_is_noop() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();
        let before = recognizer.calls();

        controller.set_language("xx");

        assert_eq!(controller.language(), RecognitionLanguage::English);
        assert_eq!(recognizer.calls(), before);
        let snapshot = ui.snapshot();
        assert_eq!(snapshot.language_label, None);
        assert!(snapshot.notifications.is_empty());
        assert!(!controller.restart_pending());
        assert_eq!(controller.report().language_switches, 0);
    }

    #[test]
    fn test_set_language_without_capability_notifies() {
        let ui = RecordingUi::new();
        let mut controller = unsupported_controller(&ui);

        controller.set_language("ger");

        assert_eq!(controller.language(), RecognitionLanguage::English);
        assert!(!controller.restart_pending());
        assert_eq!(controller.report().language_switches, 0);
        let snapshot = ui.snapshot();
        assert_eq!(snapshot.language_label, None);
        assert_eq!(
            snapshot.notifications,
            vec![(Severity::Error, MessageKey::Unsupported.as_key().to_string())]
        );

        // Unsupported codes stay silent even without a recognizer.
        controller.set_language("xx");
        assert_eq!(ui.snapshot().notifications.len(), 1);
    }

    #[test]
    fn test_start_listening_without_capability_notifies() {
        let ui = RecordingUi::new();
        let mut controller = unsupported_controller(&ui);

        assert!(!controller.start_listening());
        assert!(!controller.start_listening());

        let snapshot = ui.snapshot();
        assert_eq!(snapshot.notifications.len(), 2);
        assert!(snapshot
            .notifications
            .iter()
            .all(|(severity, message)| *severity == Severity::Error
                && message == MessageKey::Unsupported.as_key()));
        assert_eq!(snapshot.indicator, IndicatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_due_starts_when_open() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, mut rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();
        controller.set_language("fre");

        let token = match rx.recv().await {
            Some(SessionInput::RestartDue(token)) => token,
            other => panic!("Expected RestartDue, got {other:?}"),
        };
        let _ = controller.handle(SessionInput::RestartDue(token));

        assert_eq!(recognizer.calls().last(), Some(&CapabilityCall::Start));
        assert_eq!(controller.report().restarts, 1);
        assert!(!controller.restart_pending());
    }

    #[tokio::test]
    async fn test_restart_due_after_close_does_not_start() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();
        controller.set_language("rus");
        controller.toggle();

        // A firing that slipped through before the close is stale.
        let _ = controller.handle(SessionInput::RestartDue(1));

        assert_eq!(recognizer.count(&CapabilityCall::Start), 0);
        assert_eq!(controller.report().restarts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_restart_on_closed_overlay_does_not_start() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, mut rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        controller.set_language("fre");
        assert!(controller.restart_pending());

        let token = match rx.recv().await {
            Some(SessionInput::RestartDue(token)) => token,
            other => panic!("Expected RestartDue, got {other:?}"),
        };
        let _ = controller.handle(SessionInput::RestartDue(token));

        assert!(!controller.is_visible());
        assert_eq!(recognizer.count(&CapabilityCall::Start), 0);
        assert_eq!(controller.report().restarts, 0);
        assert!(!controller.restart_pending());
    }

    #[test]
    fn test_sibling_overlays_closed_only_on_open() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());

        for _ in 0..4 {
            controller.toggle();
        }

        assert!(!controller.is_visible());
        assert_eq!(ui.snapshot().sibling_closes, 2);
    }

    #[test]
    fn test_shutdown_breaks_and_closes() {
        let recognizer = MockRecognizer::new();
        let ui = RecordingUi::new();
        let (mut controller, _rx) = controller_with(&recognizer, &ui, OverlaySettings::default());
        controller.toggle();

        let flow = controller.handle(SessionInput::Shutdown);
        assert_eq!(flow, ControlFlow::Break(()));
        assert!(!controller.is_visible());
        assert!(recognizer.calls().ends_with(&[CapabilityCall::Abort, CapabilityCall::Stop]));
    }
}
