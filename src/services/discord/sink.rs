use async_trait::async_trait;

use crate::services::delivery::{SinkError, StatusSink};
use crate::services::discord::DiscordClient;
use crate::services::presentation::StatusMessage;

/// Broadcast sink: posts to the monitoring channel
pub struct ChannelSink {
    client: DiscordClient,
    channel_id: String,
}

impl ChannelSink {
    pub fn new(client: DiscordClient, channel_id: impl Into<String>) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
        }
    }
}

#[async_trait]
impl StatusSink for ChannelSink {
    async fn send(&self, message: &StatusMessage) -> Result<(), SinkError> {
        self.client.create_message(&self.channel_id, message).await
    }

    fn describe(&self) -> String {
        format!("channel {}", self.channel_id)
    }
}

/// Reply sink: completes the deferred response of one interaction
pub struct InteractionReplySink {
    client: DiscordClient,
    interaction_token: String,
    requester: String,
}

impl InteractionReplySink {
    pub fn new(client: DiscordClient, interaction_token: impl Into<String>, requester: impl Into<String>) -> Self {
        Self {
            client,
            interaction_token: interaction_token.into(),
            requester: requester.into(),
        }
    }
}

#[async_trait]
impl StatusSink for InteractionReplySink {
    async fn send(&self, message: &StatusMessage) -> Result<(), SinkError> {
        self.client
            .edit_original_response(&self.interaction_token, message)
            .await
    }

    fn describe(&self) -> String {
        format!("interaction from {}", self.requester)
    }
}
