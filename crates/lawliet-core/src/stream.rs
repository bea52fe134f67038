// ── Reactive state streams ──
//
// Subscription handle over a `watch` channel. Used for job progress,
// upload state and the filtered catalog view.

use tokio::sync::watch;

/// A subscription to a piece of observable state.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed).
pub struct StateStream<T: Clone + Send + Sync + 'static> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Wait for the next change, returning the new value.
    /// Returns `None` once the publisher is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
