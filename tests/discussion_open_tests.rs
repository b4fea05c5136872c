mod helpers;

use dealroom_server::entities::discussion::CreateDiscussionEntity;
use dealroom_server::interfaces::repositories::discussion::DiscussionRepositoryInterface;
use dealroom_server::interfaces::repositories::read_state::ReadStateRepositoryInterface;
use dealroom_server::services::discussion_service::{DiscussionService, OpenDiscussion};

use crate::helpers::{started_bridge, test_db, RecordingTransport, RoomResult};

fn open_input(deal_id: &str, buyer: &str, seller: &str, title: &str) -> OpenDiscussion {
    OpenDiscussion {
        deal_id: deal_id.to_string(),
        buyer: buyer.to_string(),
        seller: seller.to_string(),
        deal_title: title.to_string(),
    }
}

#[tokio::test]
async fn open_creates_room_and_both_read_states() {
    let db = test_db().await;
    let transport = RecordingTransport::new(RoomResult::Fixed("!room1".to_string()));
    let bridge = started_bridge(transport.clone()).await;
    let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);

    let disc = service
        .open_discussion(open_input("42", "B", "S", "Bike"))
        .await
        .unwrap();

    assert_eq!(disc.deal_id, "42");
    assert_eq!(disc.buyer, "B");
    assert_eq!(disc.seller, "S");
    assert_eq!(disc.room_id, "!room1");

    let rooms = transport.rooms_created.lock().unwrap().clone();
    assert_eq!(
        rooms,
        vec![("Bike".to_string(), "S".to_string(), "B".to_string())]
    );

    let disc_id = disc.id.clone().unwrap();
    let buyer_state = db.read_states.get(&disc_id, "B").await.unwrap().unwrap();
    let seller_state = db.read_states.get(&disc_id, "S").await.unwrap().unwrap();
    assert!(!buyer_state.has_unread);
    assert!(!seller_state.has_unread);
}

#[tokio::test]
async fn open_provisions_both_parties() {
    let db = test_db().await;
    let transport = RecordingTransport::new(RoomResult::Sequence);
    let bridge = started_bridge(transport.clone()).await;
    let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);

    service
        .open_discussion(open_input("7", "buyer-1", "seller-1", "Couch"))
        .await
        .unwrap();

    let users = transport.users_created.lock().unwrap().clone();
    assert_eq!(users, vec!["buyer-1".to_string(), "seller-1".to_string()]);
}

#[tokio::test]
async fn open_is_idempotent_per_deal_and_buyer() {
    let db = test_db().await;
    let transport = RecordingTransport::new(RoomResult::Sequence);
    let bridge = started_bridge(transport.clone()).await;
    let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);

    let first = service
        .open_discussion(open_input("42", "B", "S", "Bike"))
        .await
        .unwrap();
    let second = service
        .open_discussion(open_input("42", "B", "S", "Bike"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.room_id, second.room_id);
    assert_eq!(transport.room_calls(), 1);
}

#[tokio::test]
async fn same_buyer_different_deals_get_distinct_rooms() {
    let db = test_db().await;
    let transport = RecordingTransport::new(RoomResult::Sequence);
    let bridge = started_bridge(transport.clone()).await;
    let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);

    let first = service
        .open_discussion(open_input("1", "B", "S", "Bike"))
        .await
        .unwrap();
    let second = service
        .open_discussion(open_input("2", "B", "S", "Lamp"))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(first.room_id, second.room_id);
    assert_eq!(transport.room_calls(), 2);
}

#[tokio::test]
async fn duplicate_create_returns_existing_row() {
    let db = test_db().await;

    let first = db
        .discussions
        .create(CreateDiscussionEntity {
            deal_id: "42".to_string(),
            buyer: "B".to_string(),
            seller: "S".to_string(),
            room_id: "!roomA".to_string(),
        })
        .await
        .unwrap();

    // concurrent identical open lost the race; insert resolves to the winner
    let second = db
        .discussions
        .create(CreateDiscussionEntity {
            deal_id: "42".to_string(),
            buyer: "B".to_string(),
            seller: "S".to_string(),
            room_id: "!roomB".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.room_id, "!roomA");
}

#[tokio::test]
async fn open_rejects_blank_input() {
    let db = test_db().await;
    let transport = RecordingTransport::new(RoomResult::Sequence);
    let bridge = started_bridge(transport.clone()).await;
    let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);

    let res = service.open_discussion(open_input("", "B", "S", "Bike")).await;

    assert!(res.is_err());
    assert_eq!(transport.room_calls(), 0);
}

#[tokio::test]
async fn deleting_a_deal_cascades() {
    let db = test_db().await;
    let transport = RecordingTransport::new(RoomResult::Sequence);
    let bridge = started_bridge(transport.clone()).await;
    let service = DiscussionService::new(&bridge, &db.discussions, &db.read_states);

    let disc = service
        .open_discussion(open_input("42", "B", "S", "Bike"))
        .await
        .unwrap();
    let disc_id = disc.id.clone().unwrap();

    db.discussions.delete_by_deal("42").await.unwrap();

    assert!(db
        .discussions
        .get_by_deal_buyer("42", "B")
        .await
        .unwrap()
        .is_none());
    assert!(db.read_states.get(&disc_id, "B").await.unwrap().is_none());
    assert!(db.read_states.get(&disc_id, "S").await.unwrap().is_none());
}
