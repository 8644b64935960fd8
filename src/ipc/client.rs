// IPC Client - Sends privileged commands to the host via Unix socket

use crate::error::{HostLogError, Result};
use crate::ipc::{Command, Request, Response, ResponseData};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default socket path for host communication
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/hostlog.sock";

/// Upper bound on how long a single command may block on the socket
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(2);

/// Boundary through which the façade invokes host operations
pub trait CommandChannel: Send + Sync {
    /// Whether a host is present to receive commands
    fn is_available(&self) -> bool {
        true
    }

    /// Execute a command and wait for the host's answer
    fn invoke(&self, command: Command) -> Result<ResponseData>;
}

/// Channel used when no host shell is present
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedChannel;

impl CommandChannel for DetachedChannel {
    fn is_available(&self) -> bool {
        false
    }

    fn invoke(&self, _command: Command) -> Result<ResponseData> {
        Err(HostLogError::ChannelUnavailable)
    }
}

/// IPC client for communicating with the host
pub struct IpcClient {
    socket_path: PathBuf,
    request_id: AtomicU64,
    io_timeout: Duration,
}

impl IpcClient {
    /// Create a new IPC client with the default socket path
    pub fn new() -> Self {
        Self::with_socket_path(DEFAULT_SOCKET_PATH)
    }

    /// Create a new IPC client with a custom socket path
    pub fn with_socket_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            socket_path: path.as_ref().to_path_buf(),
            request_id: AtomicU64::new(1),
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Override the read/write timeout applied to each connection
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Send a command to the host and wait for a response.
    ///
    /// A single attempt is made; failed commands are not retried.
    pub fn send_command(&self, command: Command) -> Result<Response> {
        let request_id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = Request::new(request_id, command);

        let response = self.try_send_request(&request)?;

        // Verify response ID matches request ID
        if response.id != request_id {
            return Err(HostLogError::ProtocolError(format!(
                "Response ID mismatch: expected {}, got {}",
                request_id, response.id
            )));
        }

        Ok(response)
    }

    /// Send a request over a fresh connection
    fn try_send_request(&self, request: &Request) -> Result<Response> {
        // Connect to the Unix socket
        let mut stream = self.connect()?;

        // Serialize and send the request
        let request_json = serde_json::to_string(request).map_err(|e| {
            HostLogError::SerializationError(format!("Failed to serialize request: {}", e))
        })?;

        // Write request with newline delimiter
        writeln!(stream, "{}", request_json)
            .map_err(|e| HostLogError::IpcError(format!("Failed to write request: {}", e)))?;

        stream
            .flush()
            .map_err(|e| HostLogError::IpcError(format!("Failed to flush stream: {}", e)))?;

        // Read the response
        let mut reader = BufReader::new(stream);
        let mut response_line = String::new();
        let read = reader
            .read_line(&mut response_line)
            .map_err(|e| HostLogError::IpcError(format!("Failed to read response: {}", e)))?;

        if read == 0 {
            return Err(HostLogError::IpcError(
                "Host closed the connection without responding".to_string(),
            ));
        }

        // Deserialize the response
        serde_json::from_str(&response_line).map_err(|e| {
            HostLogError::DeserializationError(format!("Failed to deserialize response: {}", e))
        })
    }

    /// Establish a connection to the host's Unix socket
    fn connect(&self) -> Result<UnixStream> {
        // Check if socket file exists
        if !self.socket_path.exists() {
            return Err(HostLogError::ChannelUnavailable);
        }

        let stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::ConnectionRefused
                || e.kind() == std::io::ErrorKind::NotFound
            {
                HostLogError::ChannelUnavailable
            } else {
                HostLogError::ConnectionError(format!("Failed to connect to host: {}", e))
            }
        })?;

        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;

        Ok(stream)
    }

    /// Get the socket path being used
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandChannel for IpcClient {
    fn is_available(&self) -> bool {
        self.socket_path.exists()
    }

    fn invoke(&self, command: Command) -> Result<ResponseData> {
        self.send_command(command)?
            .result
            .map_err(HostLogError::Rejected)
    }
}
