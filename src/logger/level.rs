// Severity levels and their console channels

use crate::error::HostLogError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Lowercase tag used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    /// Console channel this severity is written to
    pub fn channel(&self) -> ConsoleChannel {
        match self {
            Severity::Trace => ConsoleChannel::Trace,
            Severity::Debug => ConsoleChannel::Debug,
            Severity::Info => ConsoleChannel::Info,
            Severity::Warn => ConsoleChannel::Warn,
            Severity::Error => ConsoleChannel::Error,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = HostLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(HostLogError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Local console primitive a line is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleChannel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// General-purpose channel for anything without a dedicated one
    General,
}

impl ConsoleChannel {
    /// Channel for a level given by name; unknown names use the general channel
    pub fn for_level_name(name: &str) -> Self {
        name.parse::<Severity>()
            .map(|level| level.channel())
            .unwrap_or(ConsoleChannel::General)
    }

    /// Whether the channel writes to standard error
    pub fn is_stderr(&self) -> bool {
        matches!(self, ConsoleChannel::Warn | ConsoleChannel::Error)
    }
}
