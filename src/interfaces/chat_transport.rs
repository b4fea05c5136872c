use async_trait::async_trait;

use crate::middleware::error::AppResult;

/// Contract to the external chat backend. One real client, one no-op
/// stand-in for tests and degraded mode. All returned handles are opaque
/// strings.
#[async_trait]
pub trait ChatTransportInterface: Send + Sync {
    /// Prepares backend-specific resources. Idempotent.
    async fn init(&self) -> AppResult<()>;

    /// Verifies the backend is reachable and begins serving. Call once after
    /// `init`.
    async fn start(&self) -> AppResult<()>;

    /// Provisions/links an application user to a backend account and returns
    /// the backend handle. An already existing account is success.
    async fn create_user(&self, identity: &str) -> AppResult<String>;

    /// Provisions a two-party room and returns its identifier.
    async fn create_room(
        &self,
        name: &str,
        seller_name: &str,
        buyer_name: &str,
    ) -> AppResult<String>;

    /// Releases backend resources. Safe on every exit path, including a
    /// failed startup.
    async fn shutdown(&self);
}

use std::sync::Arc;

#[async_trait]
impl<T: ChatTransportInterface> ChatTransportInterface for Arc<T> {
    async fn init(&self) -> AppResult<()> {
        (**self).init().await
    }

    async fn start(&self) -> AppResult<()> {
        (**self).start().await
    }

    async fn create_user(&self, identity: &str) -> AppResult<String> {
        (**self).create_user(identity).await
    }

    async fn create_room(
        &self,
        name: &str,
        seller_name: &str,
        buyer_name: &str,
    ) -> AppResult<String> {
        (**self).create_room(name, seller_name, buyer_name).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}
