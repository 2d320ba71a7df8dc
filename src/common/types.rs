use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NICKNAME: &str = "Guest";

/// A participant in a chat room. Identity is locally owned; the socket id is
/// assigned by the chat service on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
}

impl User {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            user_icon: None,
            socket_id: None,
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new(DEFAULT_NICKNAME)
    }
}

/// One entry of a room's message stream. Display order is insertion order,
/// which is arrival order; there are no sequence numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub is_system_message: bool,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm_id: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<String>,
}

impl ChatMessage {
    /// Locally synthesized notification (join/leave/disconnect). Never
    /// persisted; lives only for the current session.
    pub fn system(body: impl Into<String>, user: Option<&User>) -> Self {
        Self {
            is_system_message: true,
            body: body.into(),
            perm_id: Some("system".to_string()),
            timestamp: Utc::now().timestamp_millis(),
            user_nickname: user.map(|u| u.nickname.clone()),
            user_icon: user.and_then(|u| u.user_icon.clone()),
        }
    }
}

/// Typing-presence payload from the service: the set of socket ids currently
/// typing. The local user's own id is filtered out before display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingData {
    pub anyone_typing: bool,
    #[serde(default)]
    pub users_typing: Vec<String>,
}
