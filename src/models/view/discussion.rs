use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::middleware::utils::db_utils::ViewFieldSelector;

#[derive(Debug, Serialize, Deserialize)]
pub struct DiscussionView {
    pub id: Thing,
    pub deal_id: String,
    pub buyer: String,
    pub seller: String,
    pub room_id: String,
}

impl DiscussionView {
    pub fn get_fields() -> String {
        "id, deal_id, buyer, seller, room_id".to_string()
    }
}

/// One inbox entry: the discussion paired with the caller's unread flag,
/// selected off the caller's read-state row.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiscussionInboxView {
    pub discussion: DiscussionView,
    pub has_unread: bool,
    pub updated_at: DateTime<Utc>,
}

impl ViewFieldSelector for DiscussionInboxView {
    fn get_select_query_fields() -> String {
        let disc_fields = DiscussionView::get_fields();
        format!("discussion.{{{disc_fields}}} as discussion, has_unread, updated_at")
    }
}
