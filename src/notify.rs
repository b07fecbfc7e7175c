//! Where failure notifications go.
//!
//! The resolver never prints. Callers that want a user-visible message pass a
//! [`NotificationSink`] to [`Resolver::resolve_or_notify`](crate::Resolver::resolve_or_notify).

use std::sync::Mutex;

use crate::styling::{eprintln, error_message};

/// Receives user-facing failure messages.
pub trait NotificationSink {
    fn show(&self, message: &str);
}

/// Prints each notification as a styled error line on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl NotificationSink for StderrNotifier {
    fn show(&self, message: &str) {
        eprintln!("{}", error_message(message));
    }
}

/// Discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl NotificationSink for SilentNotifier {
    fn show(&self, _message: &str) {}
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for CollectingNotifier {
    fn show(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn show(&self, message: &str) {
        (**self).show(message);
    }
}
