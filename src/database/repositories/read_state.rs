use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::discussion::TABLE_NAME as DISC_TABLE_NAME;
use crate::entities::read_state::{ReadState, TABLE_NAME};
use crate::interfaces::repositories::read_state::ReadStateRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::utils::db_utils::{Pagination, QryOrder, ViewFieldSelector};

#[derive(Debug)]
pub struct ReadStateRepository {
    client: Arc<Db>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

impl ReadStateRepository {
    pub fn new(client: Arc<Db>) -> Self {
        Self { client }
    }

    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL PERMISSIONS NONE;
    DEFINE FIELD IF NOT EXISTS discussion ON TABLE {TABLE_NAME} TYPE record<{DISC_TABLE_NAME}>;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE string ASSERT string::len($value) > 0;
    DEFINE FIELD IF NOT EXISTS has_unread ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS discussion_user_unique_idx ON TABLE {TABLE_NAME} FIELDS discussion, user UNIQUE;
    DEFINE INDEX IF NOT EXISTS user_unread_idx ON TABLE {TABLE_NAME} COLUMNS user, has_unread;
");
        let mutation = self.client.query(sql).await?;
        mutation.check().expect("should mutate ReadStateRepository");

        Ok(())
    }
}

#[async_trait]
impl ReadStateRepositoryInterface for ReadStateRepository {
    async fn get(&self, discussion: &Thing, user_id: &str) -> AppResult<Option<ReadState>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE discussion=$disc AND user=$user LIMIT 1;"
            ))
            .bind(("disc", discussion.clone()))
            .bind(("user", user_id.to_string()))
            .await?;
        let data = res.take::<Vec<ReadState>>(0)?;
        Ok(data.into_iter().next())
    }

    async fn record_activity(&self, discussion: &Thing, acting_user_id: &str) -> AppResult<()> {
        // The row-level update is the linearization point; setting an
        // already-true flag again is a no-op, which keeps redelivery safe.
        // Every participant row gets its updated_at bumped so the inbox
        // sorts by most recent activity for both parties.
        let _ = self
            .client
            .query("UPDATE $disc SET updated_at=time::now();")
            .query(format!(
                "UPDATE {TABLE_NAME}
                    SET has_unread=(IF user = $acting THEN has_unread ELSE true END),
                        updated_at=time::now()
                    WHERE discussion=$disc;"
            ))
            .bind(("disc", discussion.clone()))
            .bind(("acting", acting_user_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    async fn mark_read(&self, discussion: &Thing, user_id: &str) -> AppResult<()> {
        let _ = self
            .client
            .query(format!(
                "UPDATE {TABLE_NAME} SET has_unread=false, updated_at=time::now()
                    WHERE discussion=$disc AND user=$user AND has_unread=true;"
            ))
            .bind(("disc", discussion.clone()))
            .bind(("user", user_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        let mut res = self
            .client
            .query(format!(
                "SELECT count() AS count FROM {TABLE_NAME}
                    WHERE user=$user AND has_unread=true GROUP ALL;"
            ))
            .bind(("user", user_id.to_string()))
            .await?;
        let row = res.take::<Option<CountRow>>(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    async fn get_by_user<T: for<'de> Deserialize<'de> + ViewFieldSelector + Send>(
        &self,
        user_id: &str,
        pag: Pagination,
    ) -> AppResult<Vec<T>> {
        let fields = T::get_select_query_fields();
        let order_dir = pag.order_dir.unwrap_or(QryOrder::DESC);
        let mut res = self
            .client
            .query(format!(
                "SELECT {fields} FROM {TABLE_NAME}
                    WHERE user=$user ORDER BY updated_at {order_dir}
                    LIMIT $limit START $start;"
            ))
            .bind(("user", user_id.to_string()))
            .bind(("limit", pag.count))
            .bind(("start", pag.start))
            .await?;
        let data = res.take::<Vec<T>>(0)?;
        Ok(data)
    }
}
