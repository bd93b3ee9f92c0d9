//! Notification seam.
//!
//! A run's only produced surface is one summary notification (plus logs);
//! the trait keeps delivery transport out of the engine. The host process
//! wires in whatever sender its deployment uses.

/// Dispatches one subject/body notification.
pub trait Notifier: Send + Sync {
    fn send(&self, subject: &str, body: &str);
}

/// Log-backed notifier for deployments without a wired sender.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, subject: &str, body: &str) {
        tracing::info!(subject, "notification dispatched");
        tracing::debug!(body, "notification body");
    }
}
