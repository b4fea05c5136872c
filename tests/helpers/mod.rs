use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dealroom_server::bridge::manager::BridgeManager;
use dealroom_server::database::client::{Database, DbConfig};
use dealroom_server::interfaces::chat_transport::ChatTransportInterface;
use dealroom_server::middleware::error::{AppError, AppResult};

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum RoomResult {
    Fixed(String),
    Sequence,
    TransientFail,
    PermanentFail,
}

/// Transport double that records every call; room creation outcome is
/// programmable per test.
pub struct RecordingTransport {
    pub room_result: RoomResult,
    pub fail_start: bool,
    pub rooms_created: Mutex<Vec<(String, String, String)>>,
    pub users_created: Mutex<Vec<String>>,
    counter: AtomicU32,
}

impl RecordingTransport {
    pub fn new(room_result: RoomResult) -> Arc<Self> {
        Arc::new(Self {
            room_result,
            fail_start: false,
            rooms_created: Mutex::new(vec![]),
            users_created: Mutex::new(vec![]),
            counter: AtomicU32::new(0),
        })
    }

    #[allow(dead_code)]
    pub fn unreachable_backend() -> Arc<Self> {
        Arc::new(Self {
            room_result: RoomResult::Sequence,
            fail_start: true,
            rooms_created: Mutex::new(vec![]),
            users_created: Mutex::new(vec![]),
            counter: AtomicU32::new(0),
        })
    }

    pub fn room_calls(&self) -> usize {
        self.rooms_created.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransportInterface for RecordingTransport {
    async fn init(&self) -> AppResult<()> {
        Ok(())
    }

    async fn start(&self) -> AppResult<()> {
        if self.fail_start {
            return Err(AppError::BridgeConnection {
                source: "backend unreachable".to_string(),
            });
        }
        Ok(())
    }

    async fn create_user(&self, identity: &str) -> AppResult<String> {
        self.users_created.lock().unwrap().push(identity.to_string());
        Ok(format!("@{identity}:test"))
    }

    async fn create_room(
        &self,
        name: &str,
        seller_name: &str,
        buyer_name: &str,
    ) -> AppResult<String> {
        self.rooms_created.lock().unwrap().push((
            name.to_string(),
            seller_name.to_string(),
            buyer_name.to_string(),
        ));
        match &self.room_result {
            RoomResult::Fixed(room_id) => Ok(room_id.clone()),
            RoomResult::Sequence => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
                Ok(format!("!room{n}:test"))
            }
            RoomResult::TransientFail => Err(AppError::RoomCreation {
                source: "502 - gateway timeout".to_string(),
                transient: true,
            }),
            RoomResult::PermanentFail => Err(AppError::RoomCreation {
                source: "400 - invalid room name".to_string(),
                transient: false,
            }),
        }
    }

    async fn shutdown(&self) {}
}

#[allow(dead_code)]
pub async fn test_db() -> Database {
    let db = Database::connect(DbConfig {
        url: "mem://",
        database: "test",
        namespace: "test",
        username: None,
        password: None,
    })
    .await;
    db.run_migrations().await.expect("migrations run");
    db
}

#[allow(dead_code)]
pub async fn started_bridge(transport: Arc<RecordingTransport>) -> Arc<BridgeManager> {
    let bridge = BridgeManager::new(transport);
    bridge.startup().await;
    Arc::new(bridge)
}
