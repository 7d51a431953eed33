//! Comments Module
//!
//! The four comment operations and everything they need between a parsed
//! request and a storage statement.
//!
//! ## Architecture
//!
//! ```text
//! HttpRequest
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ Router          │  (method, path) -> Route
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Contexts        │  typed headers and body
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │ ExistenceGuard  │────>│ QueryBuilder    │  (mutations only)
//! └─────────────────┘     └────────┬────────┘
//!                                  │
//!                                  ▼
//!                         ┌─────────────────┐
//!                         │ dyn Session     │  (storage module)
//!                         └────────┬────────┘
//!                                  │
//!                                  ▼
//!                   RowDecoder -> Paginator -> HttpResponse
//! ```
//!
//! ## Routes
//!
//! - `GET /comments` - list visible comments of an entity, paginated
//! - `POST /comments/make` - add a comment
//! - `PATCH /comments/delete` - soft-delete a comment
//! - `PATCH /comments/change` - replace a comment's text

pub mod context;
pub mod decode;
pub mod error;
pub mod guard;
pub mod handler;
pub mod pagination;
pub mod query;
pub mod router;

// Re-export commonly used types
pub use context::{ChangeContext, CreateContext, ListContext, TargetContext};
pub use decode::{decode_rows, decode_value, Record};
pub use error::{RequestError, RequestResult};
pub use guard::ExistenceGuard;
pub use handler::CommentHandler;
pub use pagination::{paginate, Page, MAX_PER_PAGE};
pub use query::QueryBuilder;
pub use router::{route, Route};
