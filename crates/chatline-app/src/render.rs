//! Rendering collaborator interface
//!
//! The session calls into a [`Renderer`] to show conversation entries and
//! connection feedback. Implementations own all presentation concerns.

use chatline_core::{ConnectionState, Role};

/// Presentation surface driven by the session.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer {
    /// Append a conversation entry.
    fn render_message(&mut self, role: Role, text: &str);

    /// Append a standalone error entry.
    fn render_error(&mut self, text: &str);

    /// Enable or disable user input.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Show or hide the blocking loading indicator.
    fn set_loading_visible(&mut self, visible: bool);

    /// Update the connection status display.
    fn set_status_label(&mut self, state: ConnectionState, label: &str);
}

#[cfg(any(test, feature = "test-helpers"))]
pub use recording::{RecordingRenderer, UiCall};

#[cfg(any(test, feature = "test-helpers"))]
mod recording {
    use std::sync::{Arc, Mutex, MutexGuard};

    use chatline_core::{ConnectionState, Role};

    use super::Renderer;

    /// One call made on a [`RecordingRenderer`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum UiCall {
        Message(Role, String),
        Error(String),
        InputEnabled(bool),
        LoadingVisible(bool),
        Status(ConnectionState),
    }

    /// Renderer that records every call. Clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingRenderer {
        calls: Arc<Mutex<Vec<UiCall>>>,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<UiCall> {
            self.lock().clone()
        }

        pub fn clear(&self) {
            self.lock().clear();
        }

        /// Error entries rendered so far.
        pub fn errors(&self) -> Vec<String> {
            self.lock()
                .iter()
                .filter_map(|call| match call {
                    UiCall::Error(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Conversation entries rendered so far.
        pub fn messages(&self) -> Vec<(Role, String)> {
            self.lock()
                .iter()
                .filter_map(|call| match call {
                    UiCall::Message(role, text) => Some((*role, text.clone())),
                    _ => None,
                })
                .collect()
        }

        /// Last value passed to `set_input_enabled`, if any.
        pub fn input_enabled(&self) -> Option<bool> {
            self.lock().iter().rev().find_map(|call| match call {
                UiCall::InputEnabled(enabled) => Some(*enabled),
                _ => None,
            })
        }

        fn lock(&self) -> MutexGuard<'_, Vec<UiCall>> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Renderer for RecordingRenderer {
        fn render_message(&mut self, role: Role, text: &str) {
            self.lock().push(UiCall::Message(role, text.to_string()));
        }

        fn render_error(&mut self, text: &str) {
            self.lock().push(UiCall::Error(text.to_string()));
        }

        fn set_input_enabled(&mut self, enabled: bool) {
            self.lock().push(UiCall::InputEnabled(enabled));
        }

        fn set_loading_visible(&mut self, visible: bool) {
            self.lock().push(UiCall::LoadingVisible(visible));
        }

        fn set_status_label(&mut self, state: ConnectionState, _label: &str) {
            self.lock().push(UiCall::Status(state));
        }
    }
}
