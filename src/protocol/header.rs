//! Header names used by the comments service.
//!
//! Names are stored lowercase, as `http` requires. Lookup is
//! case-insensitive and responses are written in title case.

use http::HeaderName;

pub use http::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, SERVER, TRANSFER_ENCODING};

pub const ENTITY: HeaderName = HeaderName::from_static("entity");
pub const AUTHOR: HeaderName = HeaderName::from_static("author");
pub const CREATED_BY: HeaderName = HeaderName::from_static("created_by");
pub const COMMENT_ID: HeaderName = HeaderName::from_static("comment_id");
pub const CREATED_TIME: HeaderName = HeaderName::from_static("created_time");

pub const PAGINATION_PAGE: HeaderName = HeaderName::from_static("pagination-page");
pub const PAGINATION_PER_PAGE: HeaderName = HeaderName::from_static("pagination-per-page");
pub const PAGINATION_CURRENT_PAGE: HeaderName = HeaderName::from_static("pagination-current-page");
pub const PAGINATION_TOTAL_PAGES: HeaderName = HeaderName::from_static("pagination-total-pages");
pub const PAGINATION_TOTAL_COMMENTS: HeaderName =
    HeaderName::from_static("pagination-total-comments");
