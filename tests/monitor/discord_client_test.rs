use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use chrono::Utc;
use std::sync::{Arc, Mutex};

use mc_status_relay::config::{DiscordConfig, EmbedColors, ServerTarget};
use mc_status_relay::services::delivery::{SinkError, StatusSink};
use mc_status_relay::services::discord::{ChannelSink, DiscordClient, InteractionReplySink};
use mc_status_relay::services::presentation::{Attachment, Presenter, StatusMessage};
use mc_status_relay::services::status::{normalize, QueryError};

#[derive(Debug, Clone)]
struct CapturedRequest {
    method: Method,
    path: String,
    authorization: Option<String>,
    content_type: String,
    body: Vec<u8>,
}

#[derive(Clone)]
struct FakeDiscord {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
}

async fn capture(
    State(fake): State<FakeDiscord>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    fake.requests.lock().unwrap().push(CapturedRequest {
        method,
        path: uri.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type").unwrap_or_default(),
        body: body.to_vec(),
    });
    fake.status
}

/// Serve a catch-all recorder and return a client pointed at it
async fn fake_discord(status: StatusCode) -> (DiscordClient, FakeDiscord) {
    let fake = FakeDiscord {
        requests: Arc::new(Mutex::new(Vec::new())),
        status,
    };
    let app = Router::new().fallback(capture).with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let client = DiscordClient::new(&DiscordConfig {
        token: "bot-token".to_string(),
        application_id: "app-1".to_string(),
        public_key: String::new(),
        api_base: format!("http://{}/api/v10/", addr),
    });
    (client, fake)
}

fn offline_message() -> StatusMessage {
    let presenter = Presenter::new(ServerTarget::default(), EmbedColors::default());
    presenter.render(&normalize::<QueryError>(Err(QueryError::ConnectionRefused)), Utc::now())
}

fn captured(fake: &FakeDiscord) -> Vec<CapturedRequest> {
    fake.requests.lock().unwrap().clone()
}

#[tokio::test]
async fn channel_sink_posts_json_embed() {
    let (client, fake) = fake_discord(StatusCode::OK).await;
    let sink = ChannelSink::new(client, "42");

    sink.send(&offline_message()).await.unwrap();

    let requests = captured(&fake);
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/v10/channels/42/messages");
    assert_eq!(request.authorization.as_deref(), Some("Bot bot-token"));
    assert!(request.content_type.starts_with("application/json"));

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["embeds"][0]["color"], 0xFF0000);
    assert_eq!(body["embeds"][0]["footer"]["text"], "Last checked");
}

#[tokio::test]
async fn icon_is_sent_as_multipart() {
    let (client, fake) = fake_discord(StatusCode::OK).await;
    let sink = ChannelSink::new(client, "42");

    let mut message = offline_message();
    message.attachment = Some(Attachment {
        file_name: "favicon.png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    });
    sink.send(&message).await.unwrap();

    let request = &captured(&fake)[0];
    assert!(request.content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"payload_json\""));
    assert!(body.contains("name=\"files[0]\""));
    assert!(body.contains("attachment://favicon.png"));
}

#[tokio::test]
async fn reply_sink_edits_deferred_response() {
    let (client, fake) = fake_discord(StatusCode::OK).await;
    let sink = InteractionReplySink::new(client, "interaction-token", "steve");

    sink.send(&offline_message()).await.unwrap();

    let request = &captured(&fake)[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/api/v10/webhooks/app-1/interaction-token/messages/@original");
    assert!(request.authorization.is_none());
    assert_eq!(sink.describe(), "interaction from steve");
}

#[tokio::test]
async fn commands_are_registered_in_bulk() {
    let (client, fake) = fake_discord(StatusCode::OK).await;

    client.register_commands().await.unwrap();

    let request = &captured(&fake)[0];
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/api/v10/applications/app-1/commands");

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["status", "help"]);
}

#[tokio::test]
async fn rejected_send_surfaces_status() {
    let (client, _fake) = fake_discord(StatusCode::FORBIDDEN).await;
    let sink = ChannelSink::new(client, "42");

    let err = sink.send(&offline_message()).await.unwrap_err();

    assert!(matches!(err, SinkError::Rejected { status: 403, .. }));
}

#[tokio::test]
async fn unreachable_api_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DiscordClient::new(&DiscordConfig {
        token: "bot-token".to_string(),
        application_id: "app-1".to_string(),
        public_key: String::new(),
        api_base: format!("http://{}", addr),
    });

    let err = ChannelSink::new(client, "42").send(&offline_message()).await.unwrap_err();
    assert!(matches!(err, SinkError::Network(_)));
}
