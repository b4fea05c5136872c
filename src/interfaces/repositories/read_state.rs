use crate::{
    entities::read_state::ReadState,
    middleware::{
        error::AppResult,
        utils::db_utils::{Pagination, ViewFieldSelector},
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use surrealdb::sql::Thing;

#[async_trait]
pub trait ReadStateRepositoryInterface {
    async fn get(&self, discussion: &Thing, user_id: &str) -> AppResult<Option<ReadState>>;

    /// Flags every participant row except the acting user as unread and
    /// bumps `updated_at` on all of them. Idempotent under redelivery.
    async fn record_activity(&self, discussion: &Thing, acting_user_id: &str) -> AppResult<()>;

    /// Clears the acting user's unread flag. No-op when the row is absent
    /// or already read.
    async fn mark_read(&self, discussion: &Thing, user_id: &str) -> AppResult<()>;

    /// Count of discussions with unseen activity for the user. One indexed
    /// aggregate; runs on every authenticated request.
    async fn count_unread(&self, user_id: &str) -> AppResult<u64>;

    async fn get_by_user<T: for<'de> Deserialize<'de> + ViewFieldSelector + Send>(
        &self,
        user_id: &str,
        pag: Pagination,
    ) -> AppResult<Vec<T>>;
}
