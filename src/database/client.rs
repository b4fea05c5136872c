use std::sync::Arc;

use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;

use crate::database::repositories::discussion::DiscussionRepository;
use crate::database::repositories::read_state::ReadStateRepository;
use crate::middleware::error::AppResult;

pub type Db = Surreal<Any>;

#[derive(Debug)]
pub struct DbConfig<'a> {
    pub url: &'a str,
    pub database: &'a str,
    pub namespace: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

#[derive(Debug)]
pub struct Database {
    pub client: Arc<Db>,
    pub discussions: DiscussionRepository,
    pub read_states: ReadStateRepository,
}

impl Database {
    pub async fn connect(config: DbConfig<'_>) -> Self {
        info!("->> connecting DB config = {:?}", config);
        let conn = connect(config.url)
            .await
            .expect("Failed to connect to SurrealDB");

        if let (Some(password), Some(username)) = (config.password, config.username) {
            conn.signin(Root { username, password })
                .await
                .expect("Failed to sign in to SurrealDB");
        }

        conn.use_ns(config.namespace)
            .use_db(config.database)
            .await
            .expect("Failed to select namespace and database");

        let client = Arc::new(conn);
        Self {
            discussions: DiscussionRepository::new(client.clone()),
            read_states: ReadStateRepository::new(client.clone()),
            client,
        }
    }

    pub async fn run_migrations(&self) -> AppResult<()> {
        self.discussions.mutate_db().await?;
        self.read_states.mutate_db().await?;
        Ok(())
    }
}
