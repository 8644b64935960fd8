// Host process serving the privileged command channel

use anyhow::Context;
use clap::Parser;
use hostlog::host::FrontendSink;
use hostlog::ipc::client::DEFAULT_SOCKET_PATH;
use hostlog::ipc::IpcServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Receives log records from hostlog façades and emits them as tracing events
#[derive(Parser)]
#[command(name = "hostlog-host")]
#[command(version, about, long_about = None)]
struct Args {
    /// Unix socket to listen on
    #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Tracing filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    filter: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut server = IpcServer::with_socket_path(&args.socket);
    server
        .start()
        .with_context(|| format!("Failed to listen on {}", args.socket.display()))?;
    tracing::info!("Listening on {}", server.socket_path().display());

    let stop = server.stop_handle();
    let sink = Arc::new(FrontendSink::new());

    let serving = tokio::task::spawn_blocking(move || {
        server.serve(move |command| sink.handle(command))
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    stop.stop();
    serving.await.context("Server task panicked")??;

    Ok(())
}
