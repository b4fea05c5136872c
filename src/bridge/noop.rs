use async_trait::async_trait;
use uuid::Uuid;

use crate::interfaces::chat_transport::ChatTransportInterface;
use crate::middleware::error::AppResult;

/// Stand-in transport for tests and for running without a chat backend.
/// Provisions nothing and emits no activity.
#[derive(Debug, Default)]
pub struct NoopChatTransport;

#[async_trait]
impl ChatTransportInterface for NoopChatTransport {
    async fn init(&self) -> AppResult<()> {
        Ok(())
    }

    async fn start(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_user(&self, identity: &str) -> AppResult<String> {
        Ok(format!("@{identity}:noop"))
    }

    async fn create_room(
        &self,
        _name: &str,
        _seller_name: &str,
        _buyer_name: &str,
    ) -> AppResult<String> {
        Ok(format!("!{}:noop", Uuid::new_v4()))
    }

    async fn shutdown(&self) {}
}
