// Library exports for the hostlog logging façade

pub mod config;
pub mod error;
pub mod host;
pub mod ipc;
pub mod location;
pub mod logger;

pub use config::{BuildMode, LogSettings, LogType, LoggerConfig, ResolverOptions};
pub use error::{HostLogError, Result};
pub use logger::{Logger, LoggerBuilder, Severity};
