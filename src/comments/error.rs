//! Request-level errors.
//!
//! Every failure inside one request ends up here and is turned into a
//! status code by [`RequestError::status`]. None of these outlive the
//! request that raised them.

use crate::protocol::{HeaderName, StatusCode};
use crate::storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while routing or executing a request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    /// No route exists for the method
    #[error("invalid request method '{0}'")]
    UnknownMethod(String),

    /// The method is known but the path is not
    #[error("invalid {method} request target '{path}'")]
    UnknownPath { method: String, path: String },

    /// A required header is absent
    #[error("missing header '{0}'")]
    MissingHeader(HeaderName),

    /// A header is present but cannot be used
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: HeaderName, reason: String },

    /// The body is not the expected JSON document
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The mutation target is missing or soft-deleted
    #[error("comment {comment_id} (created_time {created_time}) does not exist for entity '{entity}'")]
    NotFound {
        entity: String,
        comment_id: Uuid,
        created_time: i64,
    },

    /// The response body could not be encoded
    #[error("unable to encode response: {0}")]
    Encode(String),

    /// The store failed to run a statement
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RequestError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::UnknownMethod(_) | RequestError::UnknownPath { .. } => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Detail placed in the error body. Driver messages stay in the logs.
    pub fn public_detail(&self) -> String {
        match self {
            RequestError::Storage(_) => "storage error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for request handling.
pub type RequestResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RequestError::UnknownMethod("DELETE".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::UnknownPath {
                method: "GET".into(),
                path: "/nope".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::MissingHeader(crate::protocol::header::ENTITY).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::Storage(StorageError::Execution("down".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_public_detail_hides_driver_message() {
        let err = RequestError::Storage(StorageError::Execution("host scylla-node1 down".into()));
        assert_eq!(err.public_detail(), "storage error");

        let err = RequestError::UnknownMethod("DELETE".into());
        assert_eq!(err.public_detail(), "invalid request method 'DELETE'");
    }
}
