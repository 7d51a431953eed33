//! Server configuration.
//!
//! Every option can be given on the command line or through the
//! environment:
//!
//! - `COMMENTS_HOST` - address to bind (default: 127.0.0.1)
//! - `COMMENTS_PORT` - port to listen on (default: 8080)
//! - `COMMENTS_DEADLINE_SECS` - lifetime of one connection (default: 60)
//! - `COMMENTS_MAX_BODY_BYTES` - largest accepted request body (default: 1 MiB)
//! - `COMMENTS_LOG_LEVEL` - log filter when `RUST_LOG` is unset (default: info)
//! - `COMMENTS_SHARDS` - storage engine shard count (default: 64)
//! - `COMMENTS_CONTACT_POINTS` - comma separated `host:port` cluster nodes;
//!   when empty the in-memory engine is used (default: empty)
//!
//! ```bash
//! comments-service --host 0.0.0.0 --port 9000
//! COMMENTS_DEADLINE_SECS=5 comments-service
//! comments-service --contact-points 10.0.0.1:9042,10.0.0.2:9042
//! ```

use crate::connection::ConnectionConfig;
use crate::protocol::parser::DEFAULT_MAX_BODY_SIZE;
use crate::storage::DEFAULT_SHARDS;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use std::time::Duration;
use thiserror::Error;

/// Invalid combinations of options.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("deadline must be at least one second")]
    ZeroDeadline,

    #[error("shard count must be at least 1")]
    ZeroShards,
}

/// Command-line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "comments-service", version, about = "HTTP/JSON comments service")]
pub struct Config {
    /// Host address to bind the listener to
    #[arg(long, env = "COMMENTS_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port to listen on
    #[arg(short = 'p', long, env = "COMMENTS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds after accept before a connection is forcibly closed
    #[arg(long, env = "COMMENTS_DEADLINE_SECS", default_value_t = 60)]
    pub deadline_secs: u64,

    /// Largest request body in bytes
    #[arg(long, env = "COMMENTS_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_bytes: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "COMMENTS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Number of storage engine shards
    #[arg(long, env = "COMMENTS_SHARDS", default_value_t = DEFAULT_SHARDS)]
    pub shards: usize,

    /// Cluster nodes to connect to; the in-memory engine serves when empty
    #[arg(long, env = "COMMENTS_CONTACT_POINTS", value_delimiter = ',')]
    pub contact_points: Vec<String>,
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadline_secs == 0 {
            return Err(ConfigError::ZeroDeadline);
        }
        if self.shards == 0 {
            return Err(ConfigError::ZeroShards);
        }
        Ok(())
    }

    /// Returns true when comments live in a cluster rather than in memory.
    pub fn uses_cluster(&self) -> bool {
        !self.contact_points.is_empty()
    }

    /// Limits handed to every connection task.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            deadline: self.deadline(),
            max_body_size: self.max_body_bytes,
        }
    }
}
