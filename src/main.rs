//! comments-service - HTTP/JSON comments over a wide-column store
//!
//! This is the main entry point for the server.
//! It sets up logging, the storage session and the TCP listener.

use clap::Parser;
use comments_service::comments::CommentHandler;
use comments_service::config::Config;
use comments_service::connection::ConnectionStats;
use comments_service::server::serve;
use comments_service::storage::{ClusterSession, Session, StorageEngine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn print_banner(config: &Config) {
    println!(
        r#"
comments-service v{} - HTTP/JSON comments over a wide-column store
──────────────────────────────────────────────────────────────────
Server started on {}
Connection deadline {}s, max body {} bytes
Storage: {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        comments_service::VERSION,
        config.bind_address(),
        config.deadline_secs,
        config.max_body_bytes,
        if config.uses_cluster() {
            config.contact_points.join(", ")
        } else {
            format!("in-memory ({} shards)", config.shards)
        }
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments and environment
    let config = Config::parse();
    config.validate()?;

    // Set up logging; RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    print_banner(&config);

    // One storage session shared by every connection
    let session: Arc<dyn Session> = if config.uses_cluster() {
        // connect failures are logged by the session
        Arc::new(ClusterSession::connect(&config.contact_points).await?)
    } else {
        info!(shards = config.shards, "Storage engine initialized");
        Arc::new(StorageEngine::with_shards(config.shards))
    };

    let handler = CommentHandler::new(session);
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping server..."),
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await
            }
        }
    };

    tokio::select! {
        _ = serve(listener, handler, Arc::clone(&stats), config.connection()) => {}
        _ = shutdown => {}
    }

    info!(
        connections = stats
            .connections_accepted
            .load(std::sync::atomic::Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}
