// IPC Server - Host side of the command channel

use crate::error::{HostLogError, Result};
use crate::ipc::client::DEFAULT_SOCKET_PATH;
use crate::ipc::{Command, Request, Response, ResponseData};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pause after the first failed accept, doubled per consecutive failure
const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// IPC server accepting façade connections
pub struct IpcServer {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    shutdown: Arc<AtomicBool>,
}

/// Handle used to stop a running accept loop from another thread
#[derive(Debug, Clone)]
pub struct StopHandle {
    socket_path: PathBuf,
    shutdown: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the accept loop to exit after its current connection
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the blocking accept
        let _ = UnixStream::connect(&self.socket_path);
    }
}

impl IpcServer {
    /// Create a new IPC server with the default socket path
    pub fn new() -> Self {
        Self::with_socket_path(DEFAULT_SOCKET_PATH)
    }

    /// Create a new IPC server with a custom socket path
    pub fn with_socket_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            socket_path: path.as_ref().to_path_buf(),
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the IPC server and bind to the Unix socket
    pub fn start(&mut self) -> Result<()> {
        // Remove existing socket file if it exists
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| {
                HostLogError::IpcError(format!("Failed to remove existing socket: {}", e))
            })?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .map_err(|e| HostLogError::IpcError(format!("Failed to bind to socket: {}", e)))?;

        // Only the owning user may issue privileged commands (0600)
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.socket_path, permissions).map_err(|e| {
                HostLogError::IpcError(format!("Failed to set socket permissions: {}", e))
            })?;
        }

        self.shutdown.store(false, Ordering::SeqCst);
        self.listener = Some(listener);
        Ok(())
    }

    /// Accept a single incoming connection and return the stream
    pub fn accept(&self) -> Result<UnixStream> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| HostLogError::IpcError("Server not started".to_string()))?;

        let (stream, _addr) = listener
            .accept()
            .map_err(|e| HostLogError::IpcError(format!("Failed to accept connection: {}", e)))?;

        Ok(stream)
    }

    /// Handle a single connection: one request, one response
    pub fn handle_connection<F>(&self, stream: UnixStream, handler: F) -> Result<()>
    where
        F: FnOnce(Command) -> Result<ResponseData>,
    {
        let request = Self::read_request(&stream)?;
        let response = Self::respond(request, handler);
        Self::write_response(stream, &response)
    }

    /// Run the accept loop until the stop handle fires.
    ///
    /// Each connection is served on its own thread.
    pub fn serve<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(Command) -> Result<ResponseData> + Send + Sync + 'static,
    {
        if self.listener.is_none() {
            return Err(HostLogError::IpcError("Server not started".to_string()));
        }

        let handler = Arc::new(handler);
        let mut failures: u32 = 0;

        loop {
            let stream = match self.accept() {
                Ok(s) => {
                    failures = 0;
                    s
                }
                Err(e) => {
                    if self.shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    failures = failures.saturating_add(1);
                    let delay = accept_backoff(failures);
                    tracing::warn!("Failed to accept connection: {}, retrying in {:?}", e, delay);
                    std::thread::sleep(delay);
                    continue;
                }
            };

            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let handler = Arc::clone(&handler);
            std::thread::spawn(move || {
                let request = match Self::read_request(&stream) {
                    Ok(req) => req,
                    Err(e) => {
                        tracing::warn!("Failed to read request: {}", e);
                        return;
                    }
                };

                let response = Self::respond(request, |command| handler(command));

                if let Err(e) = Self::write_response(stream, &response) {
                    tracing::warn!("Failed to write response: {}", e);
                }
            });
        }

        Ok(())
    }

    /// Handle that stops [`IpcServer::serve`] from another thread
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            socket_path: self.socket_path.clone(),
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Run the handler and tie its outcome to the request id
    fn respond<F>(request: Request, handler: F) -> Response
    where
        F: FnOnce(Command) -> Result<ResponseData>,
    {
        match handler(request.command) {
            Ok(data) => Response::success(request.id, data),
            Err(e) => Response::error(request.id, e.to_string()),
        }
    }

    /// Read a request from a stream
    fn read_request(stream: &UnixStream) -> Result<Request> {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .map_err(|e| HostLogError::IpcError(format!("Failed to read request: {}", e)))?;

        serde_json::from_str(&request_line).map_err(|e| {
            HostLogError::DeserializationError(format!("Failed to deserialize request: {}", e))
        })
    }

    /// Write a response to a stream
    fn write_response(mut stream: UnixStream, response: &Response) -> Result<()> {
        let response_json = serde_json::to_string(response).map_err(|e| {
            HostLogError::SerializationError(format!("Failed to serialize response: {}", e))
        })?;

        writeln!(stream, "{}", response_json)
            .map_err(|e| HostLogError::IpcError(format!("Failed to write response: {}", e)))?;

        stream
            .flush()
            .map_err(|e| HostLogError::IpcError(format!("Failed to flush stream: {}", e)))?;

        Ok(())
    }

    /// Stop the server and clean up the socket file
    pub fn stop(&mut self) -> Result<()> {
        self.listener = None;

        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| {
                HostLogError::IpcError(format!("Failed to remove socket file: {}", e))
            })?;
        }

        Ok(())
    }

    /// Get the socket path being used
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Default for IpcServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        if self.listener.is_some() {
            let _ = self.stop();
        }
    }
}

/// Delay before the next accept after `failures` consecutive failures
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1u32 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}
