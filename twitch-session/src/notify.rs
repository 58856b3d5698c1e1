//! User-facing notifications.
//!
//! The host's notification overlay sits behind this trait. Calls are
//! fire-and-forget and must never block the caller.

/// Displays a user-facing error or success message.
pub trait NotificationSink: Send + Sync {
    fn display_error(&self, message: &str);
    fn display_notif(&self, message: &str);
}

/// Fallback sink that routes notifications to the tracing log. Useful for
/// headless hosts and tests.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn display_error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn display_notif(&self, message: &str) {
        tracing::info!("{message}");
    }
}
