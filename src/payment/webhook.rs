//! Inbound provider notifications.

use async_trait::async_trait;

use crate::error::ServiceError;

/// Turns a provider callback into payment status updates.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle_notification(&self, body: &[u8]) -> Result<(), ServiceError>;
}

/// Accepts every notification and does nothing with it.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreNotifications;

#[async_trait]
impl NotificationHandler for IgnoreNotifications {
    async fn handle_notification(&self, body: &[u8]) -> Result<(), ServiceError> {
        tracing::debug!(bytes = body.len(), "provider notification ignored");
        Ok(())
    }
}
