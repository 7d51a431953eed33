//! Comment Handler
//!
//! Turns one parsed request into one response. Routing, input extraction,
//! statement execution and pagination all happen here; the connection
//! layer only adds the transport headers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommentHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │   route()   │───>│  context    │───>│  operation  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                        dyn Session          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `execute` never fails. Every error is logged and mapped to a status
//! through [`RequestError::status`].

use crate::comments::context::{ChangeContext, CreateContext, ListContext, TargetContext};
use crate::comments::decode::decode_rows;
use crate::comments::error::{RequestError, RequestResult};
use crate::comments::guard::ExistenceGuard;
use crate::comments::pagination::paginate;
use crate::comments::query::QueryBuilder;
use crate::comments::router::{route, Route};
use crate::protocol::{header, response, HeaderValue, HttpRequest, HttpResponse, StatusCode};
use crate::storage::{ResultSet, Session, Statement};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Body returned by `POST /comments/make`.
#[derive(Debug, Serialize)]
struct Created {
    comment_id: Uuid,
    created_time: i64,
}

/// Dispatches requests to the comment operations.
#[derive(Clone)]
pub struct CommentHandler {
    /// Shared storage session, used concurrently by every connection
    session: Arc<dyn Session>,
}

impl CommentHandler {
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self { session }
    }

    /// Executes a request and returns the response.
    pub async fn execute(&self, request: &HttpRequest) -> HttpResponse {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    RequestError::Storage(inner) => {
                        error!(error = %inner, "Storage execution failed")
                    }
                    other => error!(
                        method = %request.method(),
                        target = %request.uri(),
                        error = %other,
                        "Request failed"
                    ),
                }
                response::error(e.status(), &e.public_detail())
            }
        }
    }

    async fn dispatch(&self, request: &HttpRequest) -> RequestResult<HttpResponse> {
        match route(request.method(), request.uri().path())? {
            Route::List => self.list(ListContext::from_request(request)?).await,
            Route::Create => self.create(CreateContext::from_request(request)?).await,
            Route::SoftDelete => {
                self.soft_delete(TargetContext::from_request(request)?)
                    .await
            }
            Route::Update => self.update(ChangeContext::from_request(request)?).await,
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    async fn list(&self, ctx: ListContext) -> RequestResult<HttpResponse> {
        info!(
            entity = %ctx.entity,
            page = ctx.page,
            per_page = ctx.per_page,
            "Fetching comments"
        );

        let result = self.run(&QueryBuilder::list(&ctx)).await?;
        let page = paginate(decode_rows(&result), ctx.page, ctx.per_page);
        let body = serde_json::to_vec(&page.items).map_err(|e| RequestError::Encode(e.to_string()))?;

        let mut response = response::with_body(StatusCode::OK, body);
        let headers = response.headers_mut();
        headers.insert(header::PAGINATION_CURRENT_PAGE, HeaderValue::from(page.page));
        headers.insert(header::PAGINATION_PER_PAGE, HeaderValue::from(page.per_page));
        headers.insert(header::PAGINATION_TOTAL_PAGES, HeaderValue::from(page.total_pages));
        headers.insert(header::PAGINATION_TOTAL_COMMENTS, HeaderValue::from(page.total_count));
        Ok(response)
    }

    async fn create(&self, ctx: CreateContext) -> RequestResult<HttpResponse> {
        info!(entity = %ctx.entity, author = %ctx.author, "Adding new comment");

        let created = Created {
            comment_id: Uuid::new_v4(),
            created_time: Utc::now().timestamp_millis(),
        };
        self.run(&QueryBuilder::create(&ctx, created.comment_id, created.created_time))
            .await?;

        let body = serde_json::to_vec(&created).map_err(|e| RequestError::Encode(e.to_string()))?;
        Ok(response::with_body(StatusCode::OK, body))
    }

    async fn soft_delete(&self, target: TargetContext) -> RequestResult<HttpResponse> {
        info!(entity = %target.entity, comment_id = %target.comment_id, "Deleting comment");

        self.require_existing(&target).await?;
        self.run(&QueryBuilder::soft_delete(&target, Utc::now().timestamp_millis()))
            .await?;
        Ok(response::empty(StatusCode::OK))
    }

    async fn update(&self, ctx: ChangeContext) -> RequestResult<HttpResponse> {
        info!(
            entity = %ctx.target.entity,
            comment_id = %ctx.target.comment_id,
            "Changing comment"
        );

        self.require_existing(&ctx.target).await?;
        self.run(&QueryBuilder::update(&ctx, Utc::now().timestamp_millis()))
            .await?;
        Ok(response::empty(StatusCode::OK))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn run(&self, statement: &Statement) -> RequestResult<ResultSet> {
        Ok(self.session.execute(statement).await?)
    }

    async fn require_existing(&self, target: &TargetContext) -> RequestResult<()> {
        let guard = ExistenceGuard::new(self.session.as_ref());
        if guard.exists(target).await? {
            return Ok(());
        }

        // logged once, by `execute`
        Err(RequestError::NotFound {
            entity: target.entity.clone(),
            comment_id: target.comment_id,
            created_time: target.created_time,
        })
    }
}
