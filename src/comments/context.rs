//! Typed request contexts.
//!
//! Each operation extracts everything it needs from the request once, up
//! front, into one of these structs. A missing or malformed field fails the
//! request before any statement is built.

use crate::comments::error::{RequestError, RequestResult};
use crate::protocol::{header, HeaderName, HttpRequest};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

/// Inputs of `GET /comments`. `page`/`per_page` are as sent, not yet clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContext {
    pub entity: String,
    pub page: i64,
    pub per_page: i64,
}

impl ListContext {
    pub fn from_request(request: &HttpRequest) -> RequestResult<Self> {
        Ok(Self {
            entity: entity(request)?,
            page: parse_header(request, header::PAGINATION_PAGE)?,
            per_page: parse_header(request, header::PAGINATION_PER_PAGE)?,
        })
    }
}

/// Inputs of `POST /comments/make`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContext {
    pub entity: String,
    pub author: String,
    pub created_by: i64,
    pub text: String,
}

impl CreateContext {
    pub fn from_request(request: &HttpRequest) -> RequestResult<Self> {
        Ok(Self {
            entity: entity(request)?,
            author: required_header(request, header::AUTHOR)?.to_string(),
            created_by: parse_header(request, header::CREATED_BY)?,
            text: text_body(request)?,
        })
    }
}

/// The `(entity, comment_id, created_time)` key of an existing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    pub entity: String,
    pub comment_id: Uuid,
    pub created_time: i64,
}

impl TargetContext {
    pub fn from_request(request: &HttpRequest) -> RequestResult<Self> {
        Ok(Self {
            entity: entity(request)?,
            comment_id: parse_header(request, header::COMMENT_ID)?,
            created_time: parse_header(request, header::CREATED_TIME)?,
        })
    }
}

/// Inputs of `PATCH /comments/change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContext {
    pub target: TargetContext,
    pub text: String,
}

impl ChangeContext {
    pub fn from_request(request: &HttpRequest) -> RequestResult<Self> {
        Ok(Self {
            target: TargetContext::from_request(request)?,
            text: text_body(request)?,
        })
    }
}

/// `{"text": "..."}`
#[derive(Debug, Deserialize)]
struct TextBody {
    text: String,
}

fn required_header<'a>(request: &'a HttpRequest, name: HeaderName) -> RequestResult<&'a str> {
    let value = match request.headers().get(&name) {
        Some(value) => value,
        None => return Err(RequestError::MissingHeader(name)),
    };
    std::str::from_utf8(value.as_bytes()).map_err(|_| RequestError::InvalidHeader {
        name,
        reason: "value is not valid UTF-8".to_string(),
    })
}

/// The partition key. It may not be empty.
fn entity(request: &HttpRequest) -> RequestResult<String> {
    let value = required_header(request, header::ENTITY)?;
    if value.is_empty() {
        return Err(RequestError::InvalidHeader {
            name: header::ENTITY,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

fn parse_header<T>(request: &HttpRequest, name: HeaderName) -> RequestResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    required_header(request, name.clone())?
        .parse()
        .map_err(|e: T::Err| RequestError::InvalidHeader {
            name,
            reason: e.to_string(),
        })
}

fn text_body(request: &HttpRequest) -> RequestResult<String> {
    serde_json::from_slice::<TextBody>(request.body())
        .map(|body| body.text)
        .map_err(|e| RequestError::InvalidBody(e.to_string()))
}
