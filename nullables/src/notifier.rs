//! Nullable notifiers — record or fail on purpose.

use std::sync::Mutex;

use xskill_marketplace::{Notification, Notifier, NotifyError};

/// Captures every delivered notification for later assertions.
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Fails every delivery. Proves that dispatch failures never surface as
/// use-case failures.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Dispatch("mail server unreachable".into()))
    }
}
