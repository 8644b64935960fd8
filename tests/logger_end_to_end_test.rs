// End-to-end test: façade talking to a real host over the socket

use hostlog::config::{BuildMode, LoggerConfig};
use hostlog::host::FrontendSink;
use hostlog::ipc::{Command, IpcServer, StopHandle};
use hostlog::logger::{BufferConsole, ConsoleChannel, InitStatus};
use hostlog::{Logger, Severity};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

struct TestHost {
    received: Arc<Mutex<Vec<Command>>>,
    stop: StopHandle,
    serving: JoinHandle<hostlog::Result<()>>,
}

impl TestHost {
    fn start(socket_path: &Path) -> Self {
        let mut server = IpcServer::with_socket_path(socket_path);
        server.start().expect("Failed to start server");
        let stop = server.stop_handle();

        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);
        let sink = FrontendSink::new();
        let serving = thread::spawn(move || {
            server.serve(move |command: Command| {
                log.lock().unwrap().push(command.clone());
                sink.handle(command)
            })
        });

        Self {
            received,
            stop,
            serving,
        }
    }

    fn commands(&self) -> Vec<Command> {
        self.received.lock().unwrap().clone()
    }

    fn shutdown(self) {
        self.stop.stop();
        self.serving.join().unwrap().expect("Serve loop failed");
    }
}

fn production_config(socket_path: &Path) -> LoggerConfig {
    LoggerConfig {
        socket_path: Some(socket_path.to_path_buf()),
        ..LoggerConfig::for_mode(BuildMode::Production)
    }
}

#[test]
fn test_production_labelled_message_reaches_host() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("host.sock");
    let host = TestHost::start(&socket_path);

    let console = Arc::new(BufferConsole::new());
    let logger = Logger::builder(production_config(&socket_path))
        .console(console.clone())
        .build();

    assert!(logger.is_initialized());

    logger.info("Saved", "profile-form");

    assert_eq!(
        console.lines_on(ConsoleChannel::Info),
        vec![
            "Logger initialized".to_string(),
            "[INFO] [profile-form] Saved".to_string()
        ]
    );
    assert!(console.lines_on(ConsoleChannel::Error).is_empty());

    let commands = host.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].name(), "init_logger_cmd");
    assert_eq!(
        commands[1],
        Command::LogFrontendMessage {
            level: Severity::Info,
            message: "Saved".to_string(),
            location: "profile-form".to_string(),
        }
    );

    host.shutdown();
}

#[test]
fn test_initialization_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("host.sock");
    let host = TestHost::start(&socket_path);

    let console = Arc::new(BufferConsole::new());
    let logger = Logger::builder(production_config(&socket_path))
        .console(console.clone())
        .build();

    assert_eq!(logger.initialize(), InitStatus::AlreadyInitialized);
    assert_eq!(logger.initialize(), InitStatus::AlreadyInitialized);

    let inits = host
        .commands()
        .iter()
        .filter(|c| c.name() == "init_logger_cmd")
        .count();
    assert_eq!(inits, 1);
    assert_eq!(console.count_containing("Logger initialized"), 1);

    host.shutdown();
}

#[test]
fn test_unreachable_host_never_fails_the_call() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("nobody.sock");

    let console = Arc::new(BufferConsole::new());
    let logger = Logger::builder(production_config(&socket_path))
        .console(console.clone())
        .build();

    assert!(!logger.is_initialized());

    logger.error("Payment failed", "checkout");

    let errors = console.lines_on(ConsoleChannel::Error);
    assert_eq!(errors[0], "[ERROR] [checkout] Payment failed");
    assert!(errors[1].starts_with("Failed to send log to backend:"));
    assert_eq!(console.count_containing("Failed to initialize logger"), 0);
}

#[test]
fn test_host_started_late_is_picked_up_by_initialize() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("host.sock");

    let console = Arc::new(BufferConsole::new());
    let logger = Logger::builder(production_config(&socket_path))
        .console(console.clone())
        .build();
    assert!(!logger.is_initialized());

    let host = TestHost::start(&socket_path);
    assert_eq!(logger.initialize(), InitStatus::Initialized);
    assert!(logger.is_initialized());

    logger.warn("Retrying upload", None);

    let commands = host.commands();
    assert_eq!(commands.len(), 2);
    match &commands[1] {
        Command::LogFrontendMessage { level, message, .. } => {
            assert_eq!(*level, Severity::Warn);
            assert_eq!(message, "Retrying upload");
        }
        other => panic!("Expected a log command, got {:?}", other),
    }

    host.shutdown();
}

#[test]
fn test_unknown_level_name_goes_to_general_channel() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("host.sock");
    let host = TestHost::start(&socket_path);

    let console = Arc::new(BufferConsole::new());
    let logger = Logger::builder(production_config(&socket_path))
        .console(console.clone())
        .build();

    logger.log_named("audit", "Exported report", "reports");

    assert_eq!(
        console.lines_on(ConsoleChannel::General),
        vec!["[AUDIT] [reports] Exported report".to_string()]
    );
    match host.commands().last() {
        Some(Command::LogFrontendMessage { level, .. }) => assert_eq!(*level, Severity::Info),
        other => panic!("Expected a log command, got {:?}", other),
    }

    host.shutdown();
}
