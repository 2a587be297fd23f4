// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One line of the visible transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Interaction strategy selected by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Chat,
    Rag,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Rag => "rag",
        }
    }
}

/// A stored turn returned by `/chats/resume`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryTurn {
    #[serde(deserialize_with = "null_as_default")]
    pub user_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bot_response: String,
    pub intent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResumeContext {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResumeResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub history: Vec<HistoryTurn>,
    #[serde(deserialize_with = "lenient_context")]
    pub context: Option<ResumeContext>,
}

// Nullable columns come back as `null`, not as missing keys.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A context that is not an object with a string summary is dropped, not an error.
fn lenient_context<'de, D>(deserializer: D) -> Result<Option<ResumeContext>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RagReply {
    #[serde(default)]
    pub response: Option<String>,
}

/// Body of a mirrored message posted to `/chats`.
#[derive(Debug, Clone, Serialize)]
pub struct MirroredMessage<'a> {
    pub session_id: &'a str,
    #[serde(flatten)]
    pub message: &'a Message,
}

/// Locally recorded intent, keyed by its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub intent: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub timestamp_ms: i64,
}

/// Logs details of each API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}
