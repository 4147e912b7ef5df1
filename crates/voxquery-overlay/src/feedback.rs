//! UI surfaces the overlay writes to.
//!
//! The overlay never reads these back; they are sinks owned by the host UI.

use voxquery_core::{IndicatorState, Severity};

use crate::messages::{Localizer, MessageKey};

/// Surfaces transient user-facing messages (toasts).
pub trait Notifier: Send {
    fn notify(&self, severity: Severity, message: &str);
}

/// The overlay panel and the search field it feeds.
pub trait OverlayView: Send {
    fn set_overlay_visible(&mut self, visible: bool);

    /// Hide any other input overlay sharing the search field (handwriting,
    /// radical picker, ...). Only one may be visible at a time.
    fn close_sibling_overlays(&mut self);

    fn set_status(&mut self, text: &str);

    fn set_indicator(&mut self, state: IndicatorState);

    /// Replace the search field's value.
    fn set_search_text(&mut self, text: &str);

    fn set_language_label(&mut self, label: &str);
}

/// The collaborators an overlay session writes feedback to.
pub struct OverlayUi {
    pub localizer: Box<dyn Localizer>,
    pub notifier: Box<dyn Notifier>,
    pub view: Box<dyn OverlayView>,
}

impl OverlayUi {
    pub fn new(
        localizer: Box<dyn Localizer>,
        notifier: Box<dyn Notifier>,
        view: Box<dyn OverlayView>,
    ) -> Self {
        Self {
            localizer,
            notifier,
            view,
        }
    }

    /// Resolve a message key and show it as a notification.
    pub fn notify(&self, severity: Severity, key: MessageKey) {
        let message = self.localizer.message(key);
        self.notifier.notify(severity, &message);
    }

    /// Write status text and indicator for the given state.
    pub fn show_indicator(&mut self, state: IndicatorState) {
        let key = match state {
            IndicatorState::Listening => MessageKey::Listening,
            IndicatorState::Idle => MessageKey::NotListening,
        };
        let status = self.localizer.message(key);
        self.view.set_status(&status);
        self.view.set_indicator(state);
    }
}

impl std::fmt::Debug for OverlayUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayUi").finish_non_exhaustive()
    }
}
