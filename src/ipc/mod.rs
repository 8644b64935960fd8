// IPC module - Privileged command channel between façade and host

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{CommandChannel, DetachedChannel, IpcClient};
pub use protocol::{Command, LogRecord, Request, Response, ResponseData, SinkSettings};
pub use server::{IpcServer, StopHandle};
