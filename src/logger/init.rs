// One-shot configuration of the backend sink

use crate::config::LogSettings;
use crate::ipc::{Command, CommandChannel, SinkSettings};
use crate::logger::console::Console;
use crate::logger::level::ConsoleChannel;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of an initialization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// The sink accepted the settings on this attempt
    Initialized,
    /// An earlier attempt already succeeded; nothing was sent
    AlreadyInitialized,
    /// No host is present; nothing was sent and nothing changed
    Deferred,
    /// The host rejected the settings or the channel failed
    Failed,
}

/// Sends the sink settings once per façade instance
#[derive(Debug)]
pub struct Initializer {
    settings: SinkSettings,
    initialized: AtomicBool,
}

impl Initializer {
    pub fn new(settings: &LogSettings) -> Self {
        Self {
            settings: SinkSettings::from(settings),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Configure the sink unless already done.
    ///
    /// Two concurrent first calls may both reach the host; re-sending the
    /// same settings is harmless.
    pub fn run(&self, channel: &dyn CommandChannel, console: &dyn Console) -> InitStatus {
        if self.is_initialized() {
            return InitStatus::AlreadyInitialized;
        }

        if !channel.is_available() {
            tracing::debug!("No host channel, deferring logger initialization");
            return InitStatus::Deferred;
        }

        let command = Command::InitLoggerCmd {
            settings: self.settings.clone(),
        };

        match channel.invoke(command) {
            Ok(_) => {
                self.initialized.store(true, Ordering::SeqCst);
                console.write(ConsoleChannel::Info, "Logger initialized");
                InitStatus::Initialized
            }
            Err(e) => {
                console.write(
                    ConsoleChannel::Error,
                    &format!("Failed to initialize logger: {}", e),
                );
                InitStatus::Failed
            }
        }
    }
}
