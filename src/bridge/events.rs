use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::bridge::matrix::{localpart, sanitize_localpart};
use crate::entities::discussion::Discussion;
use crate::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use crate::services::discussion_service::DiscussionService;
use crate::state::AppState;

/// Message activity in one backend room, as observed by the transport's
/// sync loop. Delivery is at-least-once and ordered per room.
#[derive(Debug, Clone)]
pub struct RoomActivityEvent {
    pub room_id: String,
    pub sender: String,
}

/// Drains the transport's activity channel and mirrors each notification
/// into local read state. Each notification gets its own task so one slow
/// lookup never holds up unrelated rooms.
pub fn room_activity_handler(
    state: &Arc<AppState>,
    mut rx: mpsc::Receiver<RoomActivityEvent>,
) -> JoinHandle<()> {
    let state = state.clone();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let state = state.clone();
            tokio::spawn(async move {
                handle_room_activity(&state, event).await;
            });
        }
    })
}

async fn handle_room_activity(state: &Arc<AppState>, event: RoomActivityEvent) {
    let disc = match state.db.discussions.get_by_room(&event.room_id).await {
        Ok(Some(disc)) => disc,
        Ok(None) => {
            // a room this system did not create; nothing local to update
            warn!(room_id = %event.room_id, "activity for unmapped room dropped");
            return;
        }
        Err(err) => {
            warn!(room_id = %event.room_id, %err, "room lookup failed, event dropped");
            return;
        }
    };

    let Some(disc_id) = disc.id.clone() else {
        warn!(room_id = %event.room_id, "discussion without id, event dropped");
        return;
    };

    let acting_user = resolve_acting_user(&disc, &event.sender);
    let service = DiscussionService::new(
        &state.bridge,
        &state.db.discussions,
        &state.db.read_states,
    );
    if let Err(err) = service
        .record_activity(&disc_id.to_raw(), &acting_user)
        .await
    {
        warn!(room_id = %event.room_id, %err, "recording activity failed, event dropped");
    }
}

/// Maps the backend sender handle back onto the local participant id. A
/// sender that is neither participant resolves to nobody, which flags both
/// sides unread.
fn resolve_acting_user(disc: &Discussion, sender: &str) -> String {
    let sender_local = localpart(sender);
    disc.participants()
        .iter()
        .find(|p| sanitize_localpart(p) == sender_local)
        .map(|p| p.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn discussion(buyer: &str, seller: &str) -> Discussion {
        Discussion {
            id: None,
            deal_id: "deal-1".to_string(),
            buyer: buyer.to_string(),
            seller: seller.to_string(),
            room_id: "!room1:hs".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sender_resolves_to_participant() {
        let disc = discussion("local_user:B1", "local_user:S1");
        assert_eq!(
            resolve_acting_user(&disc, "@local_user.b1:hs"),
            "local_user:B1"
        );
        assert_eq!(
            resolve_acting_user(&disc, "@local_user.s1:hs"),
            "local_user:S1"
        );
    }

    #[test]
    fn foreign_sender_resolves_to_nobody() {
        let disc = discussion("B", "S");
        assert_eq!(resolve_acting_user(&disc, "@someone.else:hs"), "");
    }
}
