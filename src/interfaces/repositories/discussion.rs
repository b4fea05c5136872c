use crate::{
    entities::discussion::{CreateDiscussionEntity, Discussion},
    middleware::error::AppResult,
};
use async_trait::async_trait;
use surrealdb::sql::Thing;

#[async_trait]
pub trait DiscussionRepositoryInterface {
    /// Persists the discussion together with both participant read-state
    /// rows in one transaction. A concurrent identical create resolves on
    /// the (deal_id, buyer) unique index and returns the existing row.
    async fn create(&self, record: CreateDiscussionEntity) -> AppResult<Discussion>;

    async fn get_by_id(&self, id: &Thing) -> AppResult<Option<Discussion>>;

    async fn get_by_deal_buyer(&self, deal_id: &str, buyer: &str)
        -> AppResult<Option<Discussion>>;

    async fn get_by_room(&self, room_id: &str) -> AppResult<Option<Discussion>>;

    /// Cascading delete used when the owning deal goes away.
    async fn delete_by_deal(&self, deal_id: &str) -> AppResult<()>;
}
