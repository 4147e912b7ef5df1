//! Terminal stand-ins for the host UI: the overlay panel, the search field
//! and the toast area all print to stdout.

use voxquery_core::{IndicatorState, Severity};
use voxquery_overlay::{Notifier, OverlayView};

#[derive(Debug, Default)]
pub struct ConsoleView {
    search_text: String,
}

impl OverlayView for ConsoleView {
    fn set_overlay_visible(&mut self, visible: bool) {
        if visible {
            println!("[overlay] open");
        } else {
            println!("[overlay] closed");
        }
    }

    fn close_sibling_overlays(&mut self) {
        tracing::trace!("Sibling overlays closed");
    }

    fn set_status(&mut self, text: &str) {
        println!("[status] {text}");
    }

    fn set_indicator(&mut self, state: IndicatorState) {
        let mark = if state.is_listening() { "(*)" } else { "( )" };
        println!("[mic] {mark}");
    }

    fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        println!("[search] {}", self.search_text);
    }

    fn set_language_label(&mut self, label: &str) {
        println!("[language] {label}");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => println!("[info] {message}"),
            Severity::Error => eprintln!("[error] {message}"),
        }
    }
}
