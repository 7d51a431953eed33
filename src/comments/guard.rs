//! Existence check run before soft-delete and update.
//!
//! The lookup and the mutation that follows are separate statements. Two
//! requests racing on the same key can both pass the check and both write.

use crate::comments::context::TargetContext;
use crate::comments::query::QueryBuilder;
use crate::storage::{Session, StorageResult};
use tracing::trace;

/// Checks that a mutation target exists and is not soft-deleted.
pub struct ExistenceGuard<'a> {
    session: &'a dyn Session,
}

impl<'a> ExistenceGuard<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    /// Returns true if exactly one visible row has this key.
    pub async fn exists(&self, target: &TargetContext) -> StorageResult<bool> {
        let result = self.session.execute(&QueryBuilder::lookup(target)).await?;
        trace!(
            entity = %target.entity,
            comment_id = %target.comment_id,
            matches = result.row_count(),
            "Existence check"
        );
        Ok(result.row_count() == 1)
    }
}
