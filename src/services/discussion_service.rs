use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::bridge::manager::BridgeManager;
use crate::entities::discussion::{CreateDiscussionEntity, Discussion};
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::interfaces::repositories::read_state::ReadStateRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::utils::db_utils::Pagination;
use crate::middleware::utils::string_utils::get_str_thing;
use crate::models::view::discussion::DiscussionInboxView;

pub const ROOM_CREATE_ATTEMPTS: u32 = 3;
pub const ROOM_CREATE_BACKOFF_START_MS: u64 = 200;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct OpenDiscussion {
    #[validate(length(min = 1, message = "deal id required"))]
    pub deal_id: String,
    #[validate(length(min = 1, message = "buyer required"))]
    pub buyer: String,
    #[validate(length(min = 1, message = "seller required"))]
    pub seller: String,
    #[validate(length(min = 1, message = "deal title required"))]
    pub deal_title: String,
}

/// Orchestrates the deal negotiation channels: one remote chat room per
/// (deal, buyer) pair, mirrored locally as a Discussion plus one read-state
/// row per participant.
pub struct DiscussionService<'a, D, R>
where
    D: DiscussionRepositoryInterface,
    R: ReadStateRepositoryInterface,
{
    bridge: &'a BridgeManager,
    discussions: &'a D,
    read_states: &'a R,
}

impl<'a, D, R> DiscussionService<'a, D, R>
where
    D: DiscussionRepositoryInterface,
    R: ReadStateRepositoryInterface,
{
    pub fn new(bridge: &'a BridgeManager, discussions: &'a D, read_states: &'a R) -> Self {
        Self {
            bridge,
            discussions,
            read_states,
        }
    }

    /// Creates or returns the discussion for (deal, buyer). Chat is a hard
    /// dependency here: while the bridge is degraded nothing is persisted
    /// and the caller gets a retryable unavailable error. Either the remote
    /// room is confirmed and everything lands in one transaction, or
    /// nothing is written.
    pub async fn open_discussion(&self, data: OpenDiscussion) -> AppResult<Discussion> {
        data.validate()?;

        if let Some(existing) = self
            .discussions
            .get_by_deal_buyer(&data.deal_id, &data.buyer)
            .await?
        {
            return Ok(existing);
        }

        if self.bridge.is_degraded() {
            return Err(AppError::BridgeUnavailable);
        }

        let transport = self.bridge.transport();
        transport.create_user(&data.buyer).await?;
        transport.create_user(&data.seller).await?;

        let room_id = self
            .create_room_with_retry(&data.deal_title, &data.seller, &data.buyer)
            .await?;

        // duplicate key from a concurrent open resolves inside create()
        self.discussions
            .create(CreateDiscussionEntity {
                deal_id: data.deal_id,
                buyer: data.buyer,
                seller: data.seller,
                room_id,
            })
            .await
    }

    async fn create_room_with_retry(
        &self,
        name: &str,
        seller: &str,
        buyer: &str,
    ) -> AppResult<String> {
        let transport = self.bridge.transport();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match transport.create_room(name, seller, buyer).await {
                Ok(room_id) => return Ok(room_id),
                Err(err) => err,
            };
            if !err.is_transient() {
                return Err(err);
            }
            if attempt >= ROOM_CREATE_ATTEMPTS {
                warn!(%err, attempt, "room creation retries exhausted");
                return Err(AppError::DiscussionCreationFailed { attempts: attempt });
            }
            let delay = backoff_delay_ms(attempt) + rand::thread_rng().gen_range(0..50);
            warn!(%err, attempt, delay_ms = delay, "room creation failed, retrying");
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    /// Inbox listing: the user's discussions ordered by most recent
    /// activity, each with that user's unread flag.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        pag: Pagination,
    ) -> AppResult<Vec<DiscussionInboxView>> {
        self.read_states
            .get_by_user::<DiscussionInboxView>(user_id, pag)
            .await
    }

    /// Unread badge count; one indexed aggregate, runs on every
    /// authenticated request.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.read_states.count_unread(user_id).await
    }

    /// Purely corrective; never fails the surrounding request flow. A
    /// missing row or an already-read one are no-ops.
    pub async fn mark_as_read(&self, user_id: &str, discussion_id: &str) {
        let Ok(disc_thing) = get_str_thing(discussion_id) else {
            return;
        };
        if let Err(err) = self.read_states.mark_read(&disc_thing, user_id).await {
            warn!(user_id, discussion_id, %err, "mark as read failed");
        }
    }

    /// Flags unseen activity for every participant other than the acting
    /// user. Idempotent under event redelivery.
    pub async fn record_activity(
        &self,
        discussion_id: &str,
        acting_user_id: &str,
    ) -> AppResult<()> {
        let disc_thing =
            get_str_thing(discussion_id).map_err(|_| AppError::UnknownDiscussion {
                ident: discussion_id.to_string(),
            })?;
        if self.discussions.get_by_id(&disc_thing).await?.is_none() {
            return Err(AppError::UnknownDiscussion {
                ident: discussion_id.to_string(),
            });
        }
        self.read_states
            .record_activity(&disc_thing, acting_user_id)
            .await
    }
}

fn backoff_delay_ms(attempt: u32) -> u64 {
    ROOM_CREATE_BACKOFF_START_MS * 2u64.pow(attempt.saturating_sub(1))
}
