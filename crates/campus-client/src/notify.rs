//! User-facing side effects: notifications and the sign-in redirect.
//!
//! The client never awaits or inspects these; they are fire-and-forget.

use tracing::{info, warn};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Sink for toast-style notifications.
pub trait Notifier: Send + Sync {
    /// Show a message to the user.
    fn show(&self, message: &str, severity: Severity);
}

/// Invoked once the session is unrecoverable and the user must sign in again.
pub trait SessionRedirect: Send + Sync {
    fn redirect_to_sign_in(&self);
}

/// Notifier that writes every notification to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => info!(target: "campus_client::notify", "{}", message),
            Severity::Error => warn!(target: "campus_client::notify", "{}", message),
        }
    }
}

/// Redirect that only records the event in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRedirect;

impl SessionRedirect for NoopRedirect {
    fn redirect_to_sign_in(&self) {
        info!("Session expired, sign-in required");
    }
}
