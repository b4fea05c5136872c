use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::bridge::RoomActivityEvent;
use crate::interfaces::chat_transport::ChatTransportInterface;
use crate::middleware::error::{AppError, AppResult};

// long-poll window the homeserver holds /sync open, plus grace on our side
const SYNC_POLL_MS: u64 = 30_000;
const SYNC_RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub url: String,
    pub server_name: String,
    pub access_token: String,
    pub request_timeout: Duration,
}

/// Client against the Matrix client-server API. Message activity observed by
/// the /sync loop is pushed into the room-activity channel in arrival order
/// per room.
pub struct MatrixChatTransport {
    config: MatrixConfig,
    http: OnceLock<Client>,
    events: mpsc::Sender<RoomActivityEvent>,
    sync_task: Mutex<Option<JoinHandle<()>>>,
}

impl MatrixChatTransport {
    pub fn new(config: MatrixConfig, events: mpsc::Sender<RoomActivityEvent>) -> Self {
        Self {
            config,
            http: OnceLock::new(),
            events,
            sync_task: Mutex::new(None),
        }
    }

    fn client(&self) -> AppResult<&Client> {
        self.http.get().ok_or(AppError::BridgeInit {
            source: "init() not called".to_string(),
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/_matrix/client/v3/{path}", self.config.url)
    }

    fn user_handle(&self, identity: &str) -> String {
        format!(
            "@{}:{}",
            sanitize_localpart(identity),
            self.config.server_name
        )
    }
}

/// Matrix localparts only allow a-z, 0-9 and ._=-/ so application user ids
/// are folded onto that alphabet. The mapping must be stable: the ingress
/// side reverses it to find the acting participant.
pub fn sanitize_localpart(identity: &str) -> String {
    identity
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "._=-".contains(c) {
                c
            } else {
                '.'
            }
        })
        .collect()
}

pub fn localpart(handle: &str) -> &str {
    handle
        .strip_prefix('@')
        .unwrap_or(handle)
        .split(':')
        .next()
        .unwrap_or("")
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn room_creation_err(source: String, transient: bool) -> AppError {
    AppError::RoomCreation { source, transient }
}

#[async_trait]
impl ChatTransportInterface for MatrixChatTransport {
    async fn init(&self) -> AppResult<()> {
        if self.http.get().is_some() {
            return Ok(());
        }
        Url::parse(&self.config.url).map_err(|e| AppError::BridgeInit {
            source: format!("invalid homeserver url - {e}"),
        })?;
        if self.config.server_name.is_empty() || self.config.access_token.is_empty() {
            return Err(AppError::BridgeInit {
                source: "server name and access token required".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| AppError::BridgeInit {
                source: e.to_string(),
            })?;
        let _ = self.http.set(client);
        Ok(())
    }

    async fn start(&self) -> AppResult<()> {
        let client = self.client()?.clone();
        let resp = client
            .get(self.api("account/whoami"))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::BridgeConnection {
                source: format!("whoami returned {}", resp.status()),
            });
        }

        let mut guard = self.sync_task.lock().expect("sync task lock poisoned");
        if guard.is_none() {
            *guard = Some(tokio::spawn(run_sync_loop(
                client,
                self.config.clone(),
                self.events.clone(),
            )));
        }
        Ok(())
    }

    async fn create_user(&self, identity: &str) -> AppResult<String> {
        let handle = self.user_handle(identity);
        let payload = json!({
            "username": sanitize_localpart(identity),
            "password": Uuid::new_v4().to_string(),
            "inhibit_login": true,
            "auth": { "type": "m.login.dummy" },
        });
        let resp = self
            .client()?
            .post(self.api("register"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::UserProvisioning {
                source: e.to_string(),
            })?;

        if resp.status().is_success() {
            return Ok(handle);
        }
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        // a handle that is already taken is a previously linked account
        if body.get("errcode").and_then(Value::as_str) == Some("M_USER_IN_USE") {
            return Ok(handle);
        }
        Err(AppError::UserProvisioning {
            source: body.to_string(),
        })
    }

    async fn create_room(
        &self,
        name: &str,
        seller_name: &str,
        buyer_name: &str,
    ) -> AppResult<String> {
        let payload = json!({
            "name": name,
            "preset": "trusted_private_chat",
            "is_direct": true,
            "invite": [self.user_handle(seller_name), self.user_handle(buyer_name)],
        });
        let resp = self
            .client()?
            .post(self.api("createRoom"))
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // network failures and timeouts are worth a retry
                room_creation_err(e.to_string(), true)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(room_creation_err(
                format!("{status} - {body}"),
                is_transient_status(status),
            ));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| room_creation_err(e.to_string(), true))?;
        body.get("room_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(room_creation_err(
                "createRoom response without room_id".to_string(),
                false,
            ))
    }

    async fn shutdown(&self) {
        if let Ok(mut guard) = self.sync_task.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

// sync loop aborts on drop so the backend connection is released on every
// exit path, including a startup that failed later on
impl Drop for MatrixChatTransport {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.sync_task.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

async fn run_sync_loop(
    client: Client,
    config: MatrixConfig,
    events: mpsc::Sender<RoomActivityEvent>,
) {
    let mut since: Option<String> = None;
    loop {
        let mut req = client
            .get(format!("{}/_matrix/client/v3/sync", config.url))
            .bearer_auth(&config.access_token)
            .timeout(Duration::from_millis(SYNC_POLL_MS) + config.request_timeout)
            .query(&[("timeout", SYNC_POLL_MS.to_string().as_str())]);
        if let Some(s) = &since {
            req = req.query(&[("since", s.as_str())]);
        }

        let resp = match req.send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(status = %resp.status(), "sync request rejected");
                tokio::time::sleep(SYNC_RETRY_BACKOFF).await;
                continue;
            }
            Err(err) => {
                warn!(%err, "sync request failed");
                tokio::time::sleep(SYNC_RETRY_BACKOFF).await;
                continue;
            }
        };

        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!(%err, "sync response unreadable");
                tokio::time::sleep(SYNC_RETRY_BACKOFF).await;
                continue;
            }
        };

        if let Some(next) = body.get("next_batch").and_then(Value::as_str) {
            since = Some(next.to_string());
        }

        let Some(rooms) = body
            .pointer("/rooms/join")
            .and_then(Value::as_object)
        else {
            continue;
        };
        for (room_id, room) in rooms {
            let Some(timeline) = room
                .pointer("/timeline/events")
                .and_then(Value::as_array)
            else {
                continue;
            };
            for event in timeline {
                if event.get("type").and_then(Value::as_str) != Some("m.room.message") {
                    continue;
                }
                let sender = event
                    .get("sender")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let activity = RoomActivityEvent {
                    room_id: room_id.clone(),
                    sender: sender.to_string(),
                };
                // channel order preserves per-room arrival order
                if events.send(activity).await.is_err() {
                    // ingress is gone, nothing left to feed
                    return;
                }
            }
        }
    }
}
