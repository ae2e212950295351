//! Settle-once completion for process invocations.

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Sending half of a one-shot completion.
///
/// Only the first call to [`Completion::settle`] delivers a value. Later calls
/// are ignored, so an exit notification that fires twice still resolves the
/// waiting invocation exactly once.
#[derive(Debug)]
pub struct Completion<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Completion<T> {
    /// Creates a completion and the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (sender, receiver) = oneshot::channel();

        (
            Self {
                sender: Mutex::new(Some(sender)),
            },
            receiver,
        )
    }

    /// Settles the completion with `value`.
    ///
    /// Returns `true` if this call settled it, `false` if it was already settled.
    pub fn settle(&self, value: T) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            return false;
        };

        // Receiver may already be gone; the completion is still consumed.
        let _ = sender.send(value);

        true
    }
}
