mod helpers;

use std::time::Duration;

use tokio::sync::mpsc;

use dealroom_server::bridge::events::{room_activity_handler, RoomActivityEvent};
use dealroom_server::entities::discussion::Discussion;
use dealroom_server::services::discussion_service::{DiscussionService, OpenDiscussion};
use dealroom_server::state::{create_app_state, AppState};
use std::sync::Arc;

use crate::helpers::{started_bridge, test_db, RecordingTransport, RoomResult};

async fn state_with_discussion() -> (Arc<AppState>, Discussion) {
    let db = test_db().await;
    let bridge = started_bridge(RecordingTransport::new(RoomResult::Fixed(
        "!room1:test".to_string(),
    )))
    .await;

    let disc = {
        let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);
        service
            .open_discussion(OpenDiscussion {
                deal_id: "42".to_string(),
                buyer: "B".to_string(),
                seller: "S".to_string(),
                deal_title: "Bike".to_string(),
            })
            .await
            .unwrap()
    };

    (create_app_state(db, bridge), disc)
}

fn unread_service(state: &AppState) -> DiscussionService<
    '_,
    dealroom_server::database::repositories::discussion::DiscussionRepository,
    dealroom_server::database::repositories::read_state::ReadStateRepository,
> {
    DiscussionService::new(&state.bridge, &state.db.discussions, &state.db.read_states)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn room_activity_flags_the_other_party() {
    let (state, _disc) = state_with_discussion().await;
    let (tx, rx) = mpsc::channel(16);
    let _handler = room_activity_handler(&state, rx);

    tx.send(RoomActivityEvent {
        room_id: "!room1:test".to_string(),
        sender: "@b:test".to_string(),
    })
    .await
    .unwrap();
    settle().await;

    let service = unread_service(&state);
    assert_eq!(service.count_unread("S").await.unwrap(), 1);
    assert_eq!(service.count_unread("B").await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn redelivered_events_change_nothing() {
    let (state, _disc) = state_with_discussion().await;
    let (tx, rx) = mpsc::channel(16);
    let _handler = room_activity_handler(&state, rx);

    for _ in 0..3 {
        tx.send(RoomActivityEvent {
            room_id: "!room1:test".to_string(),
            sender: "@b:test".to_string(),
        })
        .await
        .unwrap();
    }
    settle().await;

    let service = unread_service(&state);
    assert_eq!(service.count_unread("S").await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unmapped_rooms_are_dropped() {
    let (state, _disc) = state_with_discussion().await;
    let (tx, rx) = mpsc::channel(16);
    let _handler = room_activity_handler(&state, rx);

    tx.send(RoomActivityEvent {
        room_id: "!someone-elses-room:test".to_string(),
        sender: "@b:test".to_string(),
    })
    .await
    .unwrap();
    // a dropped event must not take the consumer down with it
    tx.send(RoomActivityEvent {
        room_id: "!room1:test".to_string(),
        sender: "@s:test".to_string(),
    })
    .await
    .unwrap();
    settle().await;

    let service = unread_service(&state);
    assert_eq!(service.count_unread("B").await.unwrap(), 1);
    assert_eq!(service.count_unread("S").await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_sender_flags_both_parties() {
    let (state, _disc) = state_with_discussion().await;
    let (tx, rx) = mpsc::channel(16);
    let _handler = room_activity_handler(&state, rx);

    tx.send(RoomActivityEvent {
        room_id: "!room1:test".to_string(),
        sender: "@moderator:test".to_string(),
    })
    .await
    .unwrap();
    settle().await;

    let service = unread_service(&state);
    assert_eq!(service.count_unread("B").await.unwrap(), 1);
    assert_eq!(service.count_unread("S").await.unwrap(), 1);
}
