use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use std::time::Duration;

use crate::config::DiscordConfig;
use crate::services::delivery::SinkError;
use crate::services::discord::{command_definitions, message_body};
use crate::services::presentation::StatusMessage;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Thin Discord REST client covering the three calls the relay makes
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    token: String,
    application_id: String,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("mc-status-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            application_id: config.application_id.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn bot_auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    pub async fn create_message(&self, channel_id: &str, message: &StatusMessage) -> Result<(), SinkError> {
        let request = self
            .http
            .post(self.url(&format!("channels/{}/messages", channel_id)))
            .header(AUTHORIZATION, self.bot_auth());

        Self::execute(with_payload(request, message)?).await
    }

    /// Fill in a deferred interaction response
    pub async fn edit_original_response(
        &self,
        interaction_token: &str,
        message: &StatusMessage,
    ) -> Result<(), SinkError> {
        let request = self.http.patch(self.url(&format!(
            "webhooks/{}/{}/messages/@original",
            self.application_id, interaction_token
        )));

        Self::execute(with_payload(request, message)?).await
    }

    pub async fn register_commands(&self) -> Result<(), SinkError> {
        let request = self
            .http
            .put(self.url(&format!("applications/{}/commands", self.application_id)))
            .header(AUTHORIZATION, self.bot_auth())
            .json(&command_definitions());

        Self::execute(request).await
    }

    async fn execute(request: RequestBuilder) -> Result<(), SinkError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Plain JSON, or multipart with `payload_json` when an icon is attached
fn with_payload(request: RequestBuilder, message: &StatusMessage) -> Result<RequestBuilder, SinkError> {
    let body = message_body(message);

    let Some(attachment) = &message.attachment else {
        return Ok(request.json(&body));
    };

    let payload_json = serde_json::to_string(&body).map_err(|e| SinkError::Encoding(e.to_string()))?;
    let file = Part::bytes(attachment.bytes.clone())
        .file_name(attachment.file_name.clone())
        .mime_str("image/png")
        .map_err(|e| SinkError::Encoding(e.to_string()))?;

    let form = Form::new()
        .text("payload_json", payload_json)
        .part("files[0]", file);

    Ok(request.multipart(form))
}
