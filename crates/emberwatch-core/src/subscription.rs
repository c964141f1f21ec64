// ── Subscription handle ──

use tokio_util::sync::CancellationToken;

/// Handle to an active feed registration.
///
/// Cancelling (explicitly or by dropping the handle) stops delivery.
/// Cancellation is idempotent.
#[must_use = "dropping a Subscription immediately unsubscribes"]
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// A handle with nothing behind it. Used when there is no live feed.
    pub fn noop() -> Self {
        let cancel = CancellationToken::new();
        cancel.cancel();
        Self { cancel }
    }

    /// Stop delivery. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsubscribe_is_idempotent() {
        let token = CancellationToken::new();
        let sub = Subscription::new(token.clone());
        assert!(sub.is_active());
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert!(token.is_cancelled());
    }

    #[test]
    fn drop_cancels() {
        let token = CancellationToken::new();
        drop(Subscription::new(token.clone()));
        assert!(token.is_cancelled());
    }

    #[test]
    fn noop_is_inactive() {
        assert!(!Subscription::noop().is_active());
    }
}
