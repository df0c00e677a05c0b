use log::{info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Safe to call more than once; later calls leave the first logger in place.
pub fn init_logger() {
    let _ = env_logger::try_init();
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}
