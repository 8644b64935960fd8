// Logger module - Public façade, console mirroring and sink initialization

pub mod console;
pub mod facade;
pub mod init;
pub mod level;

pub use console::{BufferConsole, Console, StdConsole, WriterConsole};
pub use facade::{Logger, LoggerBuilder};
pub use init::{InitStatus, Initializer};
pub use level::{ConsoleChannel, Severity};
