use serde_json::{json, Value};

use crate::services::presentation::StatusMessage;

/// JSON body for a message create or edit carrying one embed
pub fn message_body(message: &StatusMessage) -> Value {
    let mut embed = json!({
        "title": message.title,
        "description": message.description,
        "color": message.color,
        "fields": message.fields,
    });

    if let Some(footer) = &message.footer {
        embed["footer"] = json!({ "text": footer });
    }
    if let Some(timestamp) = message.timestamp {
        embed["timestamp"] = json!(timestamp.to_rfc3339());
    }

    let mut body = json!({ "embeds": [] });

    if let Some(attachment) = &message.attachment {
        embed["thumbnail"] = json!({ "url": format!("attachment://{}", attachment.file_name) });
        body["attachments"] = json!([{ "id": 0, "filename": attachment.file_name }]);
    }

    body["embeds"] = json!([embed]);
    body
}
