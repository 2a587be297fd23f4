// src/logging.rs

use crate::errors::{AdvisorError, AdvisorResult};
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use std::path::Path;

/// Starts file logging under `dir`. The terminal belongs to the UI, so nothing goes to stderr.
pub fn init_logging(dir: &Path, level: &str) -> AdvisorResult<LoggerHandle> {
    Logger::try_with_env_or_str(level)
        .map_err(|e| AdvisorError::config_error(format!("Invalid log level '{}': {}", level, e)))?
        .log_to_file(FileSpec::default().directory(dir).basename("loan-advisor"))
        .format(flexi_logger::detailed_format)
        .start()
        .map_err(|e| AdvisorError::config_error(format!("Failed to start logger: {}", e)))
}

/// Logs a backend call.
pub fn log_api_call(log: &ApiCallLog) {
    log::info!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    );
}
