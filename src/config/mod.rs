use crate::error::{HostLogError, Result};
use crate::logger::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default maximum log file size handed to the sink (10MB)
const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Kind of sink the host writes records to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Console,
    File,
    Both,
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogType::Console => write!(f, "console"),
            LogType::File => write!(f, "file"),
            LogType::Both => write!(f, "both"),
        }
    }
}

/// Build mode signalled by the hosting environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Map a boolean "is production" signal to a mode
    pub fn from_production_flag(production: bool) -> Self {
        if production {
            BuildMode::Production
        } else {
            BuildMode::Development
        }
    }
}

impl Default for BuildMode {
    /// Follows the compile profile: debug builds are development builds
    fn default() -> Self {
        Self::from_production_flag(!cfg!(debug_assertions))
    }
}

impl FromStr for BuildMode {
    type Err = HostLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            other => Err(HostLogError::ConfigValidationError(format!(
                "Invalid build mode: {}. Must be one of: development, production",
                other
            ))),
        }
    }
}

/// Static settings for the backend sink, read once by the initializer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSettings {
    /// Log file location; the host picks its own default when absent
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Sink kind
    #[serde(default = "default_log_type")]
    pub log_type: LogType,

    /// Size in bytes at which the sink rotates its file
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Minimum severity shown on the host console
    #[serde(default = "default_console_level")]
    pub console_level: Severity,

    /// Minimum severity written to the log file
    #[serde(default = "default_file_level")]
    pub file_level: Severity,
}

/// Tuning for caller-location resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Index of the caller frame, counted from the frame that requested the capture
    #[serde(default = "default_caller_depth")]
    pub caller_depth: usize,

    /// Re-anchor frame selection on façade frames when function names are known
    #[serde(default = "default_validate_frames")]
    pub validate_frames: bool,

    /// Top-level source directories a portable path starts at
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,

    /// Bundler/module-loader URL prefixes stripped from file references
    #[serde(default = "default_loader_prefixes")]
    pub loader_prefixes: Vec<String>,

    /// Static-asset path prefixes stripped from served URLs
    #[serde(default = "default_asset_prefixes")]
    pub asset_prefixes: Vec<String>,
}

/// Complete façade configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Development or production behaviour
    #[serde(default)]
    pub mode: BuildMode,

    /// Unix socket of the host command channel
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    #[serde(default)]
    pub settings: LogSettings,

    #[serde(default)]
    pub resolver: ResolverOptions,
}

// Default value functions for serde
fn default_log_type() -> LogType {
    LogType::Both
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_console_level() -> Severity {
    Severity::Info
}

fn default_file_level() -> Severity {
    Severity::Debug
}

fn default_caller_depth() -> usize {
    4
}

fn default_validate_frames() -> bool {
    true
}

fn default_source_roots() -> Vec<String> {
    ["app", "src", "components", "lib", "hooks", "constants", "types"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_loader_prefixes() -> Vec<String> {
    ["webpack-internal:///", "webpack:///", "file://"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_asset_prefixes() -> Vec<String> {
    ["/_next/static/chunks/", "/_next/static/"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_path: None,
            log_type: default_log_type(),
            max_file_size: default_max_file_size(),
            console_level: default_console_level(),
            file_level: default_file_level(),
        }
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            caller_depth: default_caller_depth(),
            validate_frames: default_validate_frames(),
            source_roots: default_source_roots(),
            loader_prefixes: default_loader_prefixes(),
            asset_prefixes: default_asset_prefixes(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::default(),
            socket_path: None,
            settings: LogSettings::default(),
            resolver: ResolverOptions::default(),
        }
    }
}

impl LoggerConfig {
    /// Configuration for the given mode with every other field defaulted
    pub fn for_mode(mode: BuildMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Load the configuration from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<LoggerConfig> {
        // Read file contents
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HostLogError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        // Determine format based on file extension
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let config = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(HostLogError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML configuration
    pub fn parse_toml(contents: &str) -> Result<LoggerConfig> {
        toml::from_str(contents)
            .map_err(|e| HostLogError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse JSON configuration
    pub fn parse_json(contents: &str) -> Result<LoggerConfig> {
        serde_json::from_str(contents)
            .map_err(|e| HostLogError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        self.resolver.validate()?;

        if let Some(ref socket) = self.socket_path {
            if socket.as_os_str().is_empty() {
                return Err(HostLogError::MissingConfigField("socketPath".to_string()));
            }
        }

        Ok(())
    }
}

impl LogSettings {
    /// Validate the sink settings
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.log_path {
            if path.as_os_str().is_empty() {
                return Err(HostLogError::MissingConfigField("logPath".to_string()));
            }
        }

        if self.max_file_size == 0 {
            return Err(HostLogError::ConfigValidationError(
                "maxFileSize must be at least 1 byte".to_string(),
            ));
        }

        Ok(())
    }
}

impl ResolverOptions {
    /// Validate the resolver tuning
    pub fn validate(&self) -> Result<()> {
        if self.caller_depth == 0 {
            return Err(HostLogError::ConfigValidationError(
                "callerDepth must be at least 1".to_string(),
            ));
        }

        let lists = [
            ("sourceRoots", &self.source_roots),
            ("loaderPrefixes", &self.loader_prefixes),
            ("assetPrefixes", &self.asset_prefixes),
        ];
        for (field, entries) in lists {
            if entries.iter().any(|entry| entry.trim().is_empty()) {
                return Err(HostLogError::ConfigValidationError(format!(
                    "{} must not contain empty entries",
                    field
                )));
            }
        }

        if self
            .source_roots
            .iter()
            .any(|root| root.contains('/') || root.contains('\\'))
        {
            return Err(HostLogError::ConfigValidationError(
                "sourceRoots must be single directory names".to_string(),
            ));
        }

        Ok(())
    }
}
