//! Listener accept loop.
//!
//! Every accepted socket gets its own task. There is no cap on concurrent
//! connections; each one is bounded only by its deadline.

use crate::comments::CommentHandler;
use crate::connection::{handle_connection, ConnectionConfig, ConnectionStats};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error};

/// Accepts connections until the listener fails permanently.
///
/// Accept errors are logged and the loop keeps going. The future never
/// completes on its own; stop it by dropping it (e.g. in a `select!`).
pub async fn serve(
    listener: TcpListener,
    handler: CommentHandler,
    stats: Arc<ConnectionStats>,
    config: ConnectionConfig,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(client = %addr, "Accepted connection");
                let handler = handler.clone();
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats, config).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageEngine;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_serves_concurrent_clients() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(ConnectionStats::new());
        let handler = CommentHandler::new(Arc::new(StorageEngine::new()));

        tokio::spawn(serve(
            listener,
            handler,
            Arc::clone(&stats),
            ConnectionConfig::default(),
        ));

        let mut clients = Vec::new();
        for i in 0..10 {
            clients.push(tokio::spawn(async move {
                let mut client = TcpStream::connect(addr).await.unwrap();
                let request = format!(
                    "GET /comments HTTP/1.1\r\nEntity: e{i}\r\nPagination-Page: 1\r\nPagination-Per-Page: 10\r\n\r\n"
                );
                client.write_all(request.as_bytes()).await.unwrap();
                let mut buf = Vec::new();
                client.read_to_end(&mut buf).await.unwrap();
                String::from_utf8(buf).unwrap()
            }));
        }

        for client in clients {
            let response = client.await.unwrap();
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 10);
        assert_eq!(stats.responses_success.load(Ordering::Relaxed), 10);
    }
}
