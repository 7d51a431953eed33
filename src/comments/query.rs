//! Statement construction for the four comment operations.
//!
//! All request data is bound as statement values. Nothing from a request is
//! ever spliced into query text.

use crate::comments::context::{ChangeContext, CreateContext, ListContext, TargetContext};
use crate::storage::{CqlValue, Query, Statement};
use uuid::Uuid;

/// Builds parameterized statements against the comments table.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Every visible row of the entity. Pagination happens after the fetch.
    pub fn list(ctx: &ListContext) -> Statement {
        Statement::new(Query::SelectVisible, vec![CqlValue::text(&ctx.entity)])
    }

    /// A new, visible row whose created and updated times are both `now`.
    pub fn create(ctx: &CreateContext, comment_id: Uuid, now: i64) -> Statement {
        Statement::new(
            Query::Insert,
            vec![
                CqlValue::Uuid(comment_id),
                CqlValue::text(&ctx.entity),
                CqlValue::text(&ctx.author),
                CqlValue::text(&ctx.text),
                CqlValue::Boolean(false),
                CqlValue::BigInt(ctx.created_by),
                CqlValue::BigInt(now),
                CqlValue::BigInt(now),
            ],
        )
    }

    /// Point lookup used by the existence guard.
    pub fn lookup(target: &TargetContext) -> Statement {
        Statement::new(Query::SelectOne, key_values(target))
    }

    pub fn soft_delete(target: &TargetContext, now: i64) -> Statement {
        let mut values = vec![CqlValue::BigInt(now)];
        values.extend(key_values(target));
        Statement::new(Query::SoftDelete, values)
    }

    pub fn update(ctx: &ChangeContext, now: i64) -> Statement {
        let mut values = vec![CqlValue::text(&ctx.text), CqlValue::BigInt(now)];
        values.extend(key_values(&ctx.target));
        Statement::new(Query::UpdateText, values)
    }
}

fn key_values(target: &TargetContext) -> Vec<CqlValue> {
    vec![
        CqlValue::text(&target.entity),
        CqlValue::Uuid(target.comment_id),
        CqlValue::BigInt(target.created_time),
    ]
}
