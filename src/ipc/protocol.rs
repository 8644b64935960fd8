// IPC Protocol definitions for façade-host communication

use crate::config::{LogSettings, LogType};
use crate::logger::Severity;
use serde::{Deserialize, Serialize};

/// Sink settings in the key naming the host expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSettings {
    pub log_path: Option<String>,
    pub log_type: LogType,
    pub max_file_size: u64,
    pub console_level: Severity,
    pub file_level: Severity,
}

impl From<&LogSettings> for SinkSettings {
    fn from(settings: &LogSettings) -> Self {
        Self {
            log_path: settings
                .log_path
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
            log_type: settings.log_type,
            max_file_size: settings.max_file_size,
            console_level: settings.console_level,
            file_level: settings.file_level,
        }
    }
}

/// A single log call as forwarded to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    pub location: String,
}

impl LogRecord {
    pub fn new(level: Severity, message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            location: location.into(),
        }
    }
}

/// Privileged commands the host executes on the façade's behalf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "args", rename_all = "snake_case")]
pub enum Command {
    /// Configure the backend sink
    InitLoggerCmd { settings: SinkSettings },
    /// Persist one log record
    LogFrontendMessage {
        level: Severity,
        message: String,
        location: String,
    },
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::InitLoggerCmd { .. } => "init_logger_cmd",
            Command::LogFrontendMessage { .. } => "log_frontend_message",
        }
    }
}

impl From<LogRecord> for Command {
    fn from(record: LogRecord) -> Self {
        Command::LogFrontendMessage {
            level: record.level,
            message: record.message,
            location: record.location,
        }
    }
}

/// Response data variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseData {
    /// Sink configured
    Initialized,
    /// Record accepted
    Logged,
    /// Record below the configured levels, dropped by the host
    Filtered,
}

/// Request message from façade to host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub command: Command,
}

/// Response message from host to façade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub result: Result<ResponseData, String>,
}

impl Request {
    pub fn new(id: u64, command: Command) -> Self {
        Self { id, command }
    }
}

impl Response {
    pub fn success(id: u64, data: ResponseData) -> Self {
        Self {
            id,
            result: Ok(data),
        }
    }

    pub fn error(id: u64, error: String) -> Self {
        Self {
            id,
            result: Err(error),
        }
    }
}
