// Logger façade - public level methods and per-call dispatch

use crate::config::LoggerConfig;
use crate::ipc::{CommandChannel, DetachedChannel, IpcClient, LogRecord};
use crate::location::{self, BacktraceSource, LocationProvider, StackSource};
use crate::logger::console::{Console, StdConsole};
use crate::logger::init::{InitStatus, Initializer};
use crate::logger::level::{ConsoleChannel, Severity};
use std::sync::Arc;

/// Logging façade handed to application code.
///
/// Every call resolves the caller location, mirrors the message to the
/// console and forwards a record to the host. No call ever fails.
pub struct Logger {
    locator: Box<dyn LocationProvider>,
    console: Arc<dyn Console>,
    channel: Arc<dyn CommandChannel>,
    initializer: Initializer,
}

/// Builder wiring a [`Logger`] to its collaborators
pub struct LoggerBuilder {
    config: LoggerConfig,
    channel: Option<Arc<dyn CommandChannel>>,
    console: Option<Arc<dyn Console>>,
    stack_source: Option<Arc<dyn StackSource>>,
}

impl LoggerBuilder {
    /// Use a specific command channel instead of the configured socket
    pub fn channel(mut self, channel: Arc<dyn CommandChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    /// Replace the native stack capture, e.g. with a webview's stack text
    pub fn stack_source(mut self, source: Arc<dyn StackSource>) -> Self {
        self.stack_source = Some(source);
        self
    }

    /// Build the logger and attempt sink initialization
    pub fn build(self) -> Logger {
        let LoggerBuilder {
            config,
            channel,
            console,
            stack_source,
        } = self;

        let channel: Arc<dyn CommandChannel> = match (channel, config.socket_path.as_ref()) {
            (Some(channel), _) => channel,
            (None, Some(path)) => Arc::new(IpcClient::with_socket_path(path)),
            (None, None) => Arc::new(DetachedChannel),
        };
        let console: Arc<dyn Console> = match console {
            Some(console) => console,
            None => Arc::new(StdConsole::new()),
        };
        let source: Arc<dyn StackSource> = match stack_source {
            Some(source) => source,
            None => Arc::new(BacktraceSource),
        };

        let logger = Logger {
            locator: location::provider_for(config.mode, &config.resolver, source),
            console,
            channel,
            initializer: Initializer::new(&config.settings),
        };
        logger.initialize();
        logger
    }
}

impl Logger {
    /// Logger with the default console, stack capture and configured channel
    pub fn new(config: LoggerConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            channel: None,
            console: None,
            stack_source: None,
        }
    }

    /// Configure the host sink if that has not succeeded yet
    pub fn initialize(&self) -> InitStatus {
        self.initializer.run(&*self.channel, &*self.console)
    }

    pub fn is_initialized(&self) -> bool {
        self.initializer.is_initialized()
    }

    #[inline(never)]
    pub fn trace<'a>(&self, message: &str, label: impl Into<Option<&'a str>>) {
        self.dispatch(Severity::Trace, Severity::Trace.channel(), "TRACE", message, label.into());
    }

    #[inline(never)]
    pub fn debug<'a>(&self, message: &str, label: impl Into<Option<&'a str>>) {
        self.dispatch(Severity::Debug, Severity::Debug.channel(), "DEBUG", message, label.into());
    }

    #[inline(never)]
    pub fn info<'a>(&self, message: &str, label: impl Into<Option<&'a str>>) {
        self.dispatch(Severity::Info, Severity::Info.channel(), "INFO", message, label.into());
    }

    #[inline(never)]
    pub fn warn<'a>(&self, message: &str, label: impl Into<Option<&'a str>>) {
        self.dispatch(Severity::Warn, Severity::Warn.channel(), "WARN", message, label.into());
    }

    #[inline(never)]
    pub fn error<'a>(&self, message: &str, label: impl Into<Option<&'a str>>) {
        self.dispatch(Severity::Error, Severity::Error.channel(), "ERROR", message, label.into());
    }

    /// Log at a level chosen at runtime
    #[inline(never)]
    pub fn log<'a>(&self, level: Severity, message: &str, label: impl Into<Option<&'a str>>) {
        let tag = level.as_str().to_ascii_uppercase();
        self.dispatch(level, level.channel(), &tag, message, label.into());
    }

    /// Log at a level given by name.
    ///
    /// Unknown names are written to the general console channel and
    /// forwarded to the host as `info`.
    #[inline(never)]
    pub fn log_named<'a>(&self, level: &str, message: &str, label: impl Into<Option<&'a str>>) {
        let tag = level.trim().to_ascii_uppercase();
        let channel = ConsoleChannel::for_level_name(level);
        let severity = level.parse::<Severity>().unwrap_or(Severity::Info);
        self.dispatch(severity, channel, &tag, message, label.into());
    }

    #[inline(never)]
    fn dispatch(
        &self,
        level: Severity,
        channel: ConsoleChannel,
        tag: &str,
        message: &str,
        label: Option<&str>,
    ) {
        let label = label.filter(|l| !l.is_empty());
        let location = self.locator.locate(label);

        self.console.write(channel, &console_line(tag, label, message));

        let record = LogRecord::new(level, message, location);
        if let Err(e) = self.channel.invoke(record.into()) {
            tracing::debug!("Dropping log record: {}", e);
            self.console.write(
                ConsoleChannel::Error,
                &format!("Failed to send log to backend: {}", e),
            );
        }
    }
}

/// `[LEVEL] [label] message`, the label part only when present
fn console_line(tag: &str, label: Option<&str>, message: &str) -> String {
    match label {
        Some(label) => format!("[{}] [{}] {}", tag, label, message),
        None => format!("[{}] {}", tag, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use crate::error::{HostLogError, Result};
    use crate::ipc::{Command, ResponseData};
    use crate::location::StackFrame;
    use crate::logger::console::{BufferConsole, WriterConsole};
    use std::sync::Mutex;

    /// Channel keeping every command it receives
    #[derive(Default)]
    struct RecordingChannel {
        commands: Mutex<Vec<Command>>,
        reject_logs: bool,
    }

    impl RecordingChannel {
        fn commands(&self) -> Vec<Command> {
            self.commands.lock().unwrap().clone()
        }

        fn records(&self) -> Vec<Command> {
            self.commands()
                .into_iter()
                .filter(|c| c.name() == "log_frontend_message")
                .collect()
        }
    }

    impl CommandChannel for RecordingChannel {
        fn invoke(&self, command: Command) -> Result<ResponseData> {
            let is_log = matches!(command, Command::LogFrontendMessage { .. });
            self.commands.lock().unwrap().push(command);
            if is_log && self.reject_logs {
                return Err(HostLogError::Rejected("sink full".to_string()));
            }
            Ok(if is_log {
                ResponseData::Logged
            } else {
                ResponseData::Initialized
            })
        }
    }

    struct NoStack;

    impl StackSource for NoStack {
        fn capture(&self) -> Result<Vec<StackFrame>> {
            Err(HostLogError::Resolution("no stack".to_string()))
        }
    }

    fn logger_with(
        mode: BuildMode,
        channel: Arc<RecordingChannel>,
        console: Arc<BufferConsole>,
    ) -> Logger {
        Logger::builder(LoggerConfig::for_mode(mode))
            .channel(channel)
            .console(console)
            .stack_source(Arc::new(NoStack))
            .build()
    }

    #[test]
    fn test_construction_initializes_sink() {
        let channel = Arc::new(RecordingChannel::default());
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Production, channel.clone(), console.clone());

        assert!(logger.is_initialized());
        assert_eq!(channel.commands()[0].name(), "init_logger_cmd");
        assert_eq!(logger.initialize(), InitStatus::AlreadyInitialized);
        assert_eq!(console.count_containing("Logger initialized"), 1);
    }

    #[test]
    fn test_info_with_label_in_production() {
        let channel = Arc::new(RecordingChannel::default());
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Production, channel.clone(), console.clone());

        logger.info("Saved", "profile-form");

        assert_eq!(
            console.lines_on(ConsoleChannel::Info).last().unwrap(),
            "[INFO] [profile-form] Saved"
        );
        assert_eq!(
            channel.records(),
            vec![Command::LogFrontendMessage {
                level: Severity::Info,
                message: "Saved".to_string(),
                location: "profile-form".to_string(),
            }]
        );
    }

    #[test]
    fn test_levels_route_to_their_channels() {
        let channel = Arc::new(RecordingChannel::default());
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Development, channel.clone(), console.clone());

        logger.trace("t", None);
        logger.debug("d", None);
        logger.warn("w", None);
        logger.error("e", None);

        assert_eq!(console.lines_on(ConsoleChannel::Trace), vec!["[TRACE] t"]);
        assert_eq!(console.lines_on(ConsoleChannel::Debug), vec!["[DEBUG] d"]);
        assert_eq!(console.lines_on(ConsoleChannel::Warn), vec!["[WARN] w"]);
        assert_eq!(console.lines_on(ConsoleChannel::Error), vec!["[ERROR] e"]);
        assert_eq!(channel.records().len(), 4);
    }

    #[test]
    fn test_unknown_level_name_uses_general_channel() {
        let channel = Arc::new(RecordingChannel::default());
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Production, channel.clone(), console.clone());

        logger.log_named("fatal", "boom", "worker");

        assert_eq!(
            console.lines_on(ConsoleChannel::General),
            vec!["[FATAL] [worker] boom"]
        );
        match &channel.records()[0] {
            Command::LogFrontendMessage { level, .. } => assert_eq!(*level, Severity::Info),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_development_falls_back_to_label() {
        let channel = Arc::new(RecordingChannel::default());
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Development, channel.clone(), console);

        logger.warn("slow", "fetch-user");
        logger.warn("slow", None);

        let locations: Vec<String> = channel
            .records()
            .into_iter()
            .filter_map(|c| match c {
                Command::LogFrontendMessage { location, .. } => Some(location),
                _ => None,
            })
            .collect();
        assert_eq!(locations, vec!["fetch-user", "unknown"]);
    }

    #[test]
    fn test_empty_label_counts_as_absent() {
        let channel = Arc::new(RecordingChannel::default());
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Production, channel, console.clone());

        logger.info("hello", "");

        assert_eq!(console.lines_on(ConsoleChannel::Info).last().unwrap(), "[INFO] hello");
    }

    #[test]
    fn test_submission_failure_reported_on_console() {
        let channel = Arc::new(RecordingChannel {
            reject_logs: true,
            ..RecordingChannel::default()
        });
        let console = Arc::new(BufferConsole::new());
        let logger = logger_with(BuildMode::Production, channel.clone(), console.clone());

        logger.info("Saved", "profile-form");

        let errors = console.lines_on(ConsoleChannel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to send log to backend"));
        // Dropped, not retried
        assert_eq!(channel.records().len(), 1);
    }

    #[test]
    fn test_detached_logger_still_logs_to_console() {
        let console = Arc::new(BufferConsole::new());
        let logger = Logger::builder(LoggerConfig::for_mode(BuildMode::Production))
            .console(console.clone())
            .build();

        assert!(!logger.is_initialized());
        logger.error("offline", "sync");

        assert!(console
            .lines_on(ConsoleChannel::Error)
            .contains(&"[ERROR] [sync] offline".to_string()));
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_closed_console_still_forwards_record() {
        let channel = Arc::new(RecordingChannel::default());
        let logger = Logger::builder(LoggerConfig::for_mode(BuildMode::Production))
            .channel(channel.clone())
            .console(Arc::new(WriterConsole::new(BrokenPipe)))
            .stack_source(Arc::new(NoStack))
            .build();

        assert!(logger.is_initialized());
        logger.info("after reader closed", "checkout");
        logger.error("still running", None);

        assert_eq!(
            channel.records(),
            vec![
                Command::LogFrontendMessage {
                    level: Severity::Info,
                    message: "after reader closed".to_string(),
                    location: "checkout".to_string(),
                },
                Command::LogFrontendMessage {
                    level: Severity::Error,
                    message: "still running".to_string(),
                    location: "unknown".to_string(),
                },
            ]
        );
    }
}
