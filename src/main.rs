use docpack_mcp::{serve_stdio, AppState, Config, LogFormat};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the protocol.
    init_tracing(LogFormat::from_env());

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("docpack-mcp");
        println!("Usage: {} <content-archive.tar.gz>", program);
        std::process::exit(1);
    }

    tracing::info!(archive = %args[1], "Starting docpack MCP server");

    let config = Config::from_env(&args[1])?;

    let start = std::time::Instant::now();
    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("Failed to load content archive: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        fingerprint = %state.fingerprint,
        "State initialized, serving on stdio",
    );

    tokio::select! {
        result = serve_stdio(state) => {
            result?;
            tracing::info!("Server shutdown complete");
        }
        _ = shutdown_signal() => {
            // The stdin reader sits on a blocking thread that runtime
            // shutdown would wait on, so exit directly.
            std::process::exit(0);
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docpack_mcp=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
