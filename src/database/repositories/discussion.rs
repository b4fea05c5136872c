use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::sql::Thing;

use super::is_unique_index_violation;
use crate::database::client::Db;
use crate::entities::discussion::{CreateDiscussionEntity, Discussion, TABLE_NAME};
use crate::entities::read_state::TABLE_NAME as READ_STATE_TABLE_NAME;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};

#[derive(Debug)]
pub struct DiscussionRepository {
    client: Arc<Db>,
}

impl DiscussionRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS deal_id ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value) > 0;
    DEFINE FIELD IF NOT EXISTS buyer ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value) > 0;
    DEFINE FIELD IF NOT EXISTS seller ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value) > 0;
    DEFINE FIELD IF NOT EXISTS room_id ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value) > 0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS deal_buyer_unique_idx ON TABLE {TABLE_NAME} FIELDS deal_id, buyer UNIQUE;
    DEFINE INDEX IF NOT EXISTS room_id_idx ON TABLE {TABLE_NAME} COLUMNS room_id;
");
        let mutation = self.client.query(sql).await?;
        mutation.check().expect("should mutate DiscussionRepository");

        Ok(())
    }
}

#[async_trait]
impl DiscussionRepositoryInterface for DiscussionRepository {
    async fn create(&self, record: CreateDiscussionEntity) -> AppResult<Discussion> {
        // Discussion and both read-state rows land in one transaction so no
        // reader ever observes a discussion with missing participant rows.
        let qry = format!(
            "BEGIN TRANSACTION;
            LET $disc = CREATE {TABLE_NAME} SET
                deal_id=$deal_id, buyer=$buyer, seller=$seller, room_id=$room_id, updated_at=time::now();
            CREATE {READ_STATE_TABLE_NAME} SET discussion=$disc[0].id, user=$buyer, has_unread=false;
            CREATE {READ_STATE_TABLE_NAME} SET discussion=$disc[0].id, user=$seller, has_unread=false;
            COMMIT TRANSACTION;"
        );

        let res = self
            .client
            .query(qry)
            .bind(("deal_id", record.deal_id.clone()))
            .bind(("buyer", record.buyer.clone()))
            .bind(("seller", record.seller.clone()))
            .bind(("room_id", record.room_id))
            .await?;

        if let Err(err) = res.check() {
            if !is_unique_index_violation(&err) {
                return Err(err.into());
            }
            // concurrent identical create won the race; fall through and
            // return what it wrote
        }

        self.get_by_deal_buyer(&record.deal_id, &record.buyer)
            .await?
            .ok_or(AppError::EntityFailIdNotFound {
                ident: format!("{}/{}", record.deal_id, record.buyer),
            })
    }

    async fn get_by_id(&self, id: &Thing) -> AppResult<Option<Discussion>> {
        let disc: Option<Discussion> = self
            .client
            .select((id.tb.clone(), id.id.to_raw()))
            .await?;
        Ok(disc)
    }

    async fn get_by_deal_buyer(
        &self,
        deal_id: &str,
        buyer: &str,
    ) -> AppResult<Option<Discussion>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE deal_id=$deal_id AND buyer=$buyer LIMIT 1;"
            ))
            .bind(("deal_id", deal_id.to_string()))
            .bind(("buyer", buyer.to_string()))
            .await?;
        let data = res.take::<Vec<Discussion>>(0)?;
        Ok(data.into_iter().next())
    }

    async fn get_by_room(&self, room_id: &str) -> AppResult<Option<Discussion>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE room_id=$room_id LIMIT 1;"
            ))
            .bind(("room_id", room_id.to_string()))
            .await?;
        let data = res.take::<Vec<Discussion>>(0)?;
        Ok(data.into_iter().next())
    }

    async fn delete_by_deal(&self, deal_id: &str) -> AppResult<()> {
        let qry = format!(
            "BEGIN TRANSACTION;
            LET $discs = SELECT VALUE id FROM {TABLE_NAME} WHERE deal_id=$deal_id;
            DELETE {READ_STATE_TABLE_NAME} WHERE $discs CONTAINS discussion;
            DELETE {TABLE_NAME} WHERE deal_id=$deal_id;
            COMMIT TRANSACTION;"
        );
        self.client
            .query(qry)
            .bind(("deal_id", deal_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}
