//! Incremental HTTP/1.x Request Parser
//!
//! The parser reads from a buffer and returns either:
//! - `Ok(Some((request, consumed)))` - A complete request, `consumed` bytes were used
//! - `Ok(None)` - Need more data, the head or body is incomplete
//! - `Err(ParseError)` - Invalid or unsupported request
//!
//! The head is tokenized by `httparse` and lifted into `http` types. The
//! connection handler appends socket reads to a buffer and calls `parse()`
//! again until a request is complete. Bodies are delimited by
//! `Content-Length` only; chunked transfer coding is rejected.
//!
//! Header values are kept as raw bytes, so obs-text is accepted here and
//! judged later by whoever reads the header.

use crate::protocol::{header, HttpRequest};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use thiserror::Error;

/// Errors that can occur during request parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The head is not valid HTTP/1.x syntax (request line, header line or version)
    #[error("malformed request head: {0}")]
    Malformed(String),

    /// The request target is not a valid URI
    #[error("invalid request target: {0:?}")]
    InvalidTarget(String),

    /// A header name or value was rejected by the `http` types
    #[error("invalid header: {0:?}")]
    InvalidHeader(String),

    /// Content-Length is not a plain digit string, or is repeated with different values
    #[error("invalid content length: {0:?}")]
    InvalidContentLength(String),

    /// Transfer codings are not supported
    #[error("unsupported transfer encoding: {0}")]
    UnsupportedTransferEncoding(String),

    /// The request head exceeds the allowed size
    #[error("request head too large: {size} bytes (max: {max})")]
    HeadTooLarge { size: usize, max: usize },

    /// The declared body exceeds the allowed size
    #[error("request body too large: {size} bytes (max: {max})")]
    BodyTooLarge { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size of the request line plus headers, blank line excluded (8 KB)
pub const MAX_HEAD_SIZE: usize = 8 * 1024;

/// Length of the `\r\n\r\n` that ends a request head
pub const HEAD_TERMINATOR_LEN: usize = 4;

/// Default maximum body size (1 MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Most header lines accepted in one request
const MAX_HEADERS: usize = 64;

/// An incremental HTTP/1.x request parser.
///
/// # Example
///
/// ```
/// use comments_service::protocol::{HttpParser, Method};
///
/// let parser = HttpParser::new();
/// let data = b"GET /comments HTTP/1.1\r\nEntity: e1\r\n\r\n";
///
/// let (request, consumed) = parser.parse(data).unwrap().unwrap();
/// assert_eq!(request.method(), Method::GET);
/// assert_eq!(request.headers()["entity"], "e1");
/// assert_eq!(consumed, data.len());
/// ```
#[derive(Debug, Clone)]
pub struct HttpParser {
    max_head_size: usize,
    max_body_size: usize,
}

impl Default for HttpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpParser {
    /// Creates a parser with the default limits.
    pub fn new() -> Self {
        Self::with_max_body_size(DEFAULT_MAX_BODY_SIZE)
    }

    /// Creates a parser with a custom body limit.
    pub fn with_max_body_size(max_body_size: usize) -> Self {
        Self {
            max_head_size: MAX_HEAD_SIZE,
            max_body_size,
        }
    }

    /// Largest complete request this parser accepts: head, blank line and body.
    pub fn max_request_size(&self) -> usize {
        self.max_head_size + HEAD_TERMINATOR_LEN + self.max_body_size
    }

    /// Attempts to parse a complete request from the buffer.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(HttpRequest, usize)>> {
        let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut head = httparse::Request::new(&mut slots);

        let head_len = match head.parse(buf) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => {
                if buf.len() > self.max_head_size + HEAD_TERMINATOR_LEN {
                    return Err(ParseError::HeadTooLarge {
                        size: buf.len(),
                        max: self.max_head_size,
                    });
                }
                return Ok(None);
            }
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        };

        let head_size = head_len.saturating_sub(HEAD_TERMINATOR_LEN);
        if head_size > self.max_head_size {
            return Err(ParseError::HeadTooLarge {
                size: head_size,
                max: self.max_head_size,
            });
        }

        let method_token = head.method.unwrap_or_default();
        let method = Method::from_bytes(method_token.as_bytes())
            .map_err(|_| ParseError::Malformed(format!("invalid method {:?}", method_token)))?;

        let target = head.path.unwrap_or_default();
        let uri = Uri::try_from(target).map_err(|_| ParseError::InvalidTarget(target.to_string()))?;

        let version = match head.version {
            Some(0) => Version::HTTP_10,
            _ => Version::HTTP_11,
        };

        let mut headers = HeaderMap::with_capacity(head.headers.len());
        for line in head.headers.iter() {
            let name = HeaderName::from_bytes(line.name.as_bytes())
                .map_err(|_| ParseError::InvalidHeader(line.name.to_string()))?;
            let value = HeaderValue::from_bytes(line.value)
                .map_err(|_| ParseError::InvalidHeader(line.name.to_string()))?;
            headers.append(name, value);
        }

        if let Some(coding) = headers.get(header::TRANSFER_ENCODING) {
            return Err(ParseError::UnsupportedTransferEncoding(
                String::from_utf8_lossy(coding.as_bytes()).into_owned(),
            ));
        }

        let body_len = content_length(&headers)?;
        if body_len > self.max_body_size {
            return Err(ParseError::BodyTooLarge {
                size: body_len,
                max: self.max_body_size,
            });
        }

        let total_needed = head_len + body_len;
        if buf.len() < total_needed {
            return Ok(None); // Body incomplete
        }

        let mut request = HttpRequest::new(Bytes::copy_from_slice(&buf[head_len..total_needed]));
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        *request.version_mut() = version;
        *request.headers_mut() = headers;

        Ok(Some((request, total_needed)))
    }
}

/// Reads the body length, treating a missing header as an empty body.
///
/// Only `1*DIGIT` is accepted; signs, spaces and lists are rejected.
fn content_length(headers: &HeaderMap) -> ParseResult<usize> {
    let mut length: Option<usize> = None;

    for value in headers.get_all(header::CONTENT_LENGTH) {
        let raw = value.as_bytes();
        let invalid = || ParseError::InvalidContentLength(String::from_utf8_lossy(raw).into_owned());

        if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let parsed = raw.iter().try_fold(0usize, |acc, digit| {
            acc.checked_mul(10)?.checked_add(usize::from(digit - b'0'))
        });
        let parsed = parsed.ok_or_else(invalid)?;

        match length {
            Some(existing) if existing != parsed => return Err(invalid()),
            _ => length = Some(parsed),
        }
    }

    Ok(length.unwrap_or(0))
}

/// Helper function to parse a single request with default limits.
pub fn parse_request(buf: &[u8]) -> ParseResult<Option<(HttpRequest, usize)>> {
    HttpParser::new().parse(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_headers() {
        let input = b"GET /comments HTTP/1.1\r\n\
                      Entity: e1\r\n\
                      Pagination-Page: 2\r\n\
                      Pagination-Per-Page: 10\r\n\r\n";
        let (request, consumed) = parse_request(input).unwrap().unwrap();

        assert_eq!(consumed, input.len());
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/comments");
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.headers()["Entity"], "e1");
        assert_eq!(request.headers()[header::PAGINATION_PAGE], "2");
        assert_eq!(request.headers()["pagination-per-page"], "10");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_head_incomplete() {
        let input = b"GET /comments HTTP/1.1\r\nEntity: e1\r\n";
        assert!(parse_request(input).unwrap().is_none());
    }

    #[test]
    fn test_parse_body() {
        let input = b"POST /comments/make HTTP/1.1\r\n\
                      Content-Length: 14\r\n\r\n\
                      {\"text\":\"hey\"}";
        let (request, consumed) = parse_request(input).unwrap().unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(request.method(), Method::POST);
        assert_eq!(&request.body()[..], b"{\"text\":\"hey\"}");
    }

    #[test]
    fn test_parse_body_incomplete() {
        let input = b"POST /comments/make HTTP/1.1\r\nContent-Length: 15\r\n\r\n{\"te";
        assert!(parse_request(input).unwrap().is_none());
    }

    #[test]
    fn test_parse_leaves_trailing_bytes() {
        let input = b"GET / HTTP/1.0\r\n\r\nGARBAGE";
        let (request, consumed) = parse_request(input).unwrap().unwrap();
        assert_eq!(request.version(), Version::HTTP_10);
        assert_eq!(consumed, input.len() - "GARBAGE".len());
    }

    #[test]
    fn test_query_string_kept_in_uri() {
        let input = b"GET /comments?sort=asc HTTP/1.1\r\n\r\n";
        let (request, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(request.uri().path(), "/comments");
        assert_eq!(request.uri().query(), Some("sort=asc"));
    }

    #[test]
    fn test_parse_leading_header_whitespace_skipped() {
        let input = b"GET / HTTP/1.1\r\nAuthor:\t  ariz\r\n\r\n";
        let (request, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(request.headers()["author"], "ariz");
    }

    #[test]
    fn test_obs_text_header_value_accepted() {
        let input = b"GET /comments HTTP/1.1\r\nEntity: caf\xE9\r\n\r\n";
        let (request, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(request.headers()["entity"].as_bytes(), b"caf\xE9");
    }

    #[test]
    fn test_parse_unknown_method_kept() {
        let input = b"BREW /pot HTTP/1.1\r\n\r\n";
        let (request, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(request.method().as_str(), "BREW");
    }

    #[test]
    fn test_malformed_request_line() {
        assert!(matches!(
            parse_request(b"GET /comments\r\n\r\n"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_request(b"NOT-HTTP\r\n\r\n"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        assert!(matches!(
            parse_request(b"GET / HTTP/2.0\r\n\r\n"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse_request(b"GET / HTTP/1.1\r\nno colon here\r\n\r\n"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_request(b"GET / HTTP/1.1\r\nBad Name: x\r\n\r\n"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_content_length() {
        for value in ["-1", "+2", "2 2", "0x2", "1,1", "99999999999999999999999"] {
            let input = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\nab", value);
            assert!(
                matches!(
                    parse_request(input.as_bytes()),
                    Err(ParseError::InvalidContentLength(_))
                ),
                "accepted Content-Length {:?}",
                value
            );
        }
        assert!(matches!(
            parse_request(b"POST / HTTP/1.1\r\nContent-Length: 1\r\nContent-Length: 2\r\n\r\nab"),
            Err(ParseError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn test_repeated_equal_content_length() {
        let input = b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 2\r\n\r\nab";
        let (request, _) = parse_request(input).unwrap().unwrap();
        assert_eq!(&request.body()[..], b"ab");
    }

    #[test]
    fn test_chunked_rejected() {
        let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        assert_eq!(
            parse_request(input).unwrap_err(),
            ParseError::UnsupportedTransferEncoding("chunked".to_string())
        );
    }

    fn head_of_size(size: usize) -> Vec<u8> {
        let mut head = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        head.resize(size, b'a');
        head
    }

    #[test]
    fn test_head_at_limit_accepted() {
        let mut input = head_of_size(MAX_HEAD_SIZE);
        input.extend_from_slice(b"\r\n\r\n");
        let (_, consumed) = parse_request(&input).unwrap().unwrap();
        assert_eq!(consumed, MAX_HEAD_SIZE + HEAD_TERMINATOR_LEN);
    }

    #[test]
    fn test_head_too_large() {
        let input = head_of_size(MAX_HEAD_SIZE + HEAD_TERMINATOR_LEN + 1);
        assert!(matches!(
            parse_request(&input),
            Err(ParseError::HeadTooLarge { .. })
        ));

        let mut input = head_of_size(MAX_HEAD_SIZE + 1);
        input.extend_from_slice(b"\r\n\r\n");
        assert!(matches!(
            parse_request(&input),
            Err(ParseError::HeadTooLarge { .. })
        ));
    }

    #[test]
    fn test_body_too_large() {
        let parser = HttpParser::with_max_body_size(4);
        let input = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        assert_eq!(
            parser.parse(input).unwrap_err(),
            ParseError::BodyTooLarge { size: 5, max: 4 }
        );
    }

    #[test]
    fn test_max_request_size() {
        let parser = HttpParser::with_max_body_size(10);
        assert_eq!(parser.max_request_size(), MAX_HEAD_SIZE + 4 + 10);
    }
}
