use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub const TABLE_NAME: &str = "discussion_read_state";

/// Per participant unread flag, one row per (discussion, user). The two rows
/// of a discussion are created together with it and live until it is deleted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReadState {
    pub discussion: Thing,
    pub user: String,
    pub has_unread: bool,
    pub updated_at: DateTime<Utc>,
}
