//! Side-effect hooks invoked when a fetch fails.
//!
//! A failed fetch shows a [`Notice`], logs the user out and reloads. Each of
//! those effects is a trait so front-ends can plug in their own surface (a
//! toast, a status line) and tests can record the calls.

use async_trait::async_trait;
use sensordash::Notice;

/// Surfaces a short-lived notice to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Default [`Notifier`]: emits the notice as a `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::warn!(class = %notice.class, "{notice}");
    }
}

/// Tears the current session down.
#[async_trait]
pub trait Logout: Send + Sync {
    async fn logout(&self);
}

/// Resets the client to a known state, re-running the session lookup from
/// durable storage.
#[async_trait]
pub trait Reload: Send + Sync {
    async fn reload(&self);
}
