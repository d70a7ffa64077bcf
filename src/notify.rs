use crate::ui;
use crate::{log_error, log_info};

/// Where user-facing messages from the controller end up
pub trait Notifier: Send + Sync {
    /// A one-line informational message ("Auto-commit started successfully!")
    fn info(&self, message: &str);

    /// A one-line error message
    fn error(&self, message: &str);

    /// Intermediate setup progress; ignored unless the host shows it
    fn progress(&self, _message: &str) {}
}

/// Prints notifications to the terminal and mirrors them into the log
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        log_info!("{}", message);
        ui::print_success(message);
    }

    fn error(&self, message: &str) {
        log_error!("{}", message);
        ui::print_error(message);
    }

    fn progress(&self, message: &str) {
        log_info!("{}", message);
        ui::print_info(message);
    }
}
