// Integration test for the command channel wire format

use hostlog::config::LogSettings;
use hostlog::ipc::{Command, LogRecord, Request, Response, ResponseData, SinkSettings};
use hostlog::Severity;
use serde_json::json;
use std::path::PathBuf;

#[test]
fn test_init_command_wire_shape() {
    let settings = LogSettings::default();
    let request = Request::new(
        7,
        Command::InitLoggerCmd {
            settings: SinkSettings::from(&settings),
        },
    );

    let value = serde_json::to_value(&request).expect("Failed to serialize request");

    assert_eq!(
        value,
        json!({
            "id": 7,
            "command": {
                "cmd": "init_logger_cmd",
                "args": {
                    "settings": {
                        "log_path": null,
                        "log_type": "both",
                        "max_file_size": 10485760,
                        "console_level": "info",
                        "file_level": "debug"
                    }
                }
            }
        })
    );
}

#[test]
fn test_init_command_with_path() {
    let settings = LogSettings {
        log_path: Some(PathBuf::from("/var/log/app")),
        ..LogSettings::default()
    };
    let command = Command::InitLoggerCmd {
        settings: SinkSettings::from(&settings),
    };

    let json = serde_json::to_string(&command).expect("Failed to serialize");
    assert!(json.contains("\"log_path\":\"/var/log/app\""));
}

#[test]
fn test_log_message_wire_shape() {
    let command = Command::from(LogRecord::new(Severity::Info, "Saved", "profile-form"));
    let value = serde_json::to_value(&command).expect("Failed to serialize");

    assert_eq!(
        value,
        json!({
            "cmd": "log_frontend_message",
            "args": { "level": "info", "message": "Saved", "location": "profile-form" }
        })
    );
}

#[test]
fn test_request_from_host_json() {
    let raw = r#"{"id":3,"command":{"cmd":"log_frontend_message","args":{"level":"warn","message":"slow","location":"src/api.ts:9"}}}"#;

    let request: Request = serde_json::from_str(raw).expect("Failed to deserialize");

    assert_eq!(request.id, 3);
    assert_eq!(
        request.command,
        Command::LogFrontendMessage {
            level: Severity::Warn,
            message: "slow".to_string(),
            location: "src/api.ts:9".to_string(),
        }
    );
}

#[test]
fn test_response_serialization() {
    let ok = Response::success(1, ResponseData::Logged);
    let err = Response::error(2, "sink closed".to_string());

    let ok_back: Response =
        serde_json::from_str(&serde_json::to_string(&ok).unwrap()).expect("Failed to deserialize");
    let err_back: Response =
        serde_json::from_str(&serde_json::to_string(&err).unwrap()).expect("Failed to deserialize");

    assert_eq!(ok_back.result, Ok(ResponseData::Logged));
    assert_eq!(err_back.id, 2);
    assert_eq!(err_back.result, Err("sink closed".to_string()));
}

#[test]
fn test_unknown_command_is_rejected() {
    let raw = r#"{"cmd":"delete_logs","args":{}}"#;
    assert!(serde_json::from_str::<Command>(raw).is_err());
}
