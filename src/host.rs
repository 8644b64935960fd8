// Host-side receiver turning channel commands into tracing events

use crate::error::Result;
use crate::ipc::{Command, ResponseData, SinkSettings};
use crate::logger::Severity;
use std::sync::RwLock;

/// Receiving end of the command channel.
///
/// Records are re-emitted as `tracing` events with target `frontend`, so the
/// host's subscriber decides where they are stored.
#[derive(Debug, Default)]
pub struct FrontendSink {
    settings: RwLock<Option<SinkSettings>>,
}

impl FrontendSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings received from the last `init_logger_cmd`
    pub fn settings(&self) -> Option<SinkSettings> {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Lowest severity the sink keeps; everything before configuration
    pub fn threshold(&self) -> Severity {
        self.settings()
            .map(|s| s.console_level.min(s.file_level))
            .unwrap_or(Severity::Trace)
    }

    /// Execute one command
    pub fn handle(&self, command: Command) -> Result<ResponseData> {
        match command {
            Command::InitLoggerCmd { settings } => {
                tracing::info!(
                    log_path = ?settings.log_path,
                    log_type = %settings.log_type,
                    max_file_size = settings.max_file_size,
                    console_level = %settings.console_level,
                    file_level = %settings.file_level,
                    "Frontend logger configured"
                );
                let mut guard = match self.settings.write() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                *guard = Some(settings);
                Ok(ResponseData::Initialized)
            }
            Command::LogFrontendMessage {
                level,
                message,
                location,
            } => {
                if level < self.threshold() {
                    return Ok(ResponseData::Filtered);
                }
                emit(level, &message, &location);
                Ok(ResponseData::Logged)
            }
        }
    }
}

fn emit(level: Severity, message: &str, location: &str) {
    match level {
        Severity::Error => tracing::error!(target: "frontend", location = %location, "{}", message),
        Severity::Warn => tracing::warn!(target: "frontend", location = %location, "{}", message),
        Severity::Info => tracing::info!(target: "frontend", location = %location, "{}", message),
        Severity::Debug => tracing::debug!(target: "frontend", location = %location, "{}", message),
        Severity::Trace => tracing::trace!(target: "frontend", location = %location, "{}", message),
    }
}
