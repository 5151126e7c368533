//! Terminal rendering for client notifications.

use campus_client::{Notifier, SessionRedirect, Severity};
use console::Style;

/// Prints notifications to stderr, keeping stdout clean for command output.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => {
                let green = Style::new().green();
                eprintln!("{} {}", green.apply_to("✓"), message);
            }
            Severity::Error => {
                let red = Style::new().red();
                eprintln!("{} {}", red.apply_to("✗"), red.apply_to(message));
            }
        }
    }
}

/// A terminal cannot navigate anywhere; point the user at the login command.
#[derive(Debug, Default)]
pub struct LoginHint;

impl SessionRedirect for LoginHint {
    fn redirect_to_sign_in(&self) {
        let dim = Style::new().dim();
        eprintln!("{}", dim.apply_to("Run 'campus auth login' to sign in again."));
    }
}
