use async_trait::async_trait;

use crate::services::delivery::SinkError;
use crate::services::presentation::StatusMessage;

/// Destination for rendered status messages
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn send(&self, message: &StatusMessage) -> Result<(), SinkError>;

    /// Short name for logs
    fn describe(&self) -> String;
}
