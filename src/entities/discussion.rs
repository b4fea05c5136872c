use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub const TABLE_NAME: &str = "discussion";

/// One negotiation channel for exactly one (deal, buyer, seller) triple.
/// `room_id` is the opaque handle of the remote chat room; a discussion is
/// never persisted without one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Discussion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub deal_id: String,
    pub buyer: String,
    pub seller: String,
    pub room_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discussion {
    pub fn participants(&self) -> [&str; 2] {
        [self.buyer.as_str(), self.seller.as_str()]
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.buyer == user_id || self.seller == user_id
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CreateDiscussionEntity {
    pub deal_id: String,
    pub buyer: String,
    pub seller: String,
    pub room_id: String,
}
