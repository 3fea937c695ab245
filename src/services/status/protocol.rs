//! Server List Ping framing: VarInt-prefixed packets over a plain TCP stream.

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::services::status::{QueryError, RawModInfo, RawPlayers, RawStatus, RawVersion};

/// Protocol version sent in the handshake; -1 asks the server for its own
const HANDSHAKE_PROTOCOL: i32 = -1;
const NEXT_STATE_STATUS: i32 = 1;

const PACKET_STATUS: i32 = 0x00;
const PACKET_PING: i32 = 0x01;

/// Status JSON may carry a large favicon, but not more than this
const MAX_PACKET_LEN: i32 = 2 * 1024 * 1024;

pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push(((value & 0x7F) | 0x80) as u8);
        value >>= 7;
    }
}

pub fn write_string(buf: &mut Vec<u8>, value: &str) {
    write_varint(buf, value.len() as i32);
    buf.extend_from_slice(value.as_bytes());
}

/// Prefix `packet_id + body` with its VarInt length
pub fn frame(packet_id: i32, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(body.len() + 5);
    write_varint(&mut payload, packet_id);
    payload.extend_from_slice(body);

    let mut packet = Vec::with_capacity(payload.len() + 5);
    write_varint(&mut packet, payload.len() as i32);
    packet.extend_from_slice(&payload);
    packet
}

pub fn handshake_packet(host: &str, port: u16) -> Vec<u8> {
    let mut body = Vec::new();
    write_varint(&mut body, HANDSHAKE_PROTOCOL);
    write_string(&mut body, host);
    body.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut body, NEXT_STATE_STATUS);
    frame(0x00, &body)
}

pub fn status_request_packet() -> Vec<u8> {
    frame(PACKET_STATUS, &[])
}

pub fn ping_packet(payload: i64) -> Vec<u8> {
    frame(PACKET_PING, &payload.to_be_bytes())
}

pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, QueryError> {
    let mut result: u32 = 0;
    for position in 0..5 {
        let byte = reader.read_u8().await?;
        result |= ((byte & 0x7F) as u32) << (7 * position);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(QueryError::Protocol("VarInt is too long".to_string()))
}

async fn read_packet_header<R: AsyncRead + Unpin>(
    reader: &mut R,
    expected_id: i32,
) -> Result<i32, QueryError> {
    let length = read_varint(reader).await?;
    if length <= 0 || length > MAX_PACKET_LEN {
        return Err(QueryError::Protocol(format!("invalid packet length {}", length)));
    }

    let packet_id = read_varint(reader).await?;
    if packet_id != expected_id {
        return Err(QueryError::Protocol(format!(
            "unexpected packet id {:#04x}, expected {:#04x}",
            packet_id, expected_id
        )));
    }
    Ok(length)
}

/// Read the status response packet and return its JSON document
pub async fn read_status_json<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, QueryError> {
    let packet_len = read_packet_header(reader, PACKET_STATUS).await?;

    let json_len = read_varint(reader).await?;
    if json_len < 0 || json_len >= packet_len {
        return Err(QueryError::Protocol(format!("invalid string length {}", json_len)));
    }

    let mut buf = vec![0u8; json_len as usize];
    reader.read_exact(&mut buf).await?;

    String::from_utf8(buf).map_err(|e| QueryError::Protocol(e.to_string()))
}

/// Read the pong and check it echoes our payload
pub async fn read_pong<R: AsyncRead + Unpin>(reader: &mut R, payload: i64) -> Result<(), QueryError> {
    read_packet_header(reader, PACKET_PING).await?;
    let echoed = reader.read_i64().await?;
    if echoed != payload {
        return Err(QueryError::Protocol("pong payload mismatch".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlpResponse {
    pub version: RawVersion,
    pub players: RawPlayers,
    #[serde(default)]
    pub description: Value,
    pub favicon: Option<String>,
    pub modinfo: Option<LegacyModInfo>,
    pub forge_data: Option<ForgeData>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyModInfo {
    #[serde(rename = "modList", default)]
    pub mod_list: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ForgeData {
    #[serde(default)]
    pub mods: Vec<Value>,
}

impl SlpResponse {
    pub fn into_raw(self, round_trip_latency: u64) -> RawStatus {
        let mod_info = match (self.modinfo, self.forge_data) {
            (Some(legacy), _) => Some(mod_names(&legacy.mod_list, &["modid", "modId"])),
            (None, Some(forge)) => Some(mod_names(&forge.mods, &["modId", "modid"])),
            (None, None) => None,
        };

        RawStatus {
            players: self.players,
            version: self.version,
            motd: flatten_description(&self.description),
            round_trip_latency,
            favicon: self.favicon,
            mod_info,
        }
    }
}

fn mod_names(mods: &[Value], keys: &[&str]) -> RawModInfo {
    let mod_list = mods
        .iter()
        .map(|entry| {
            keys.iter()
                .find_map(|key| entry.get(*key).and_then(Value::as_str))
                .unwrap_or("unknown")
                .to_string()
        })
        .collect();
    RawModInfo { mod_list }
}

/// Flatten a plain or chat-component description into clean text
pub fn flatten_description(description: &Value) -> String {
    let mut out = String::new();
    collect_text(description, &mut out);
    strip_formatting(out.trim())
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => out.push_str(text),
        Value::Array(parts) => parts.iter().for_each(|part| collect_text(part, out)),
        Value::Object(component) => {
            if let Some(text) = component.get("text") {
                collect_text(text, out);
            }
            if let Some(extra) = component.get("extra") {
                collect_text(extra, out);
            }
        }
        _ => {}
    }
}

/// Drop `§x` formatting codes
pub fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}
