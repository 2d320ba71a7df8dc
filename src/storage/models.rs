use crate::common::types::ChatMessage;

/// Persisted message row. System messages never reach this table, so the
/// reconstructed ChatMessage is always a regular one.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub room_id: String,
    pub body: String,
    pub perm_id: Option<String>,
    pub timestamp: i64,
    pub user_nickname: Option<String>,
    pub user_icon: Option<String>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            is_system_message: false,
            body: row.body,
            perm_id: row.perm_id,
            timestamp: row.timestamp,
            user_nickname: row.user_nickname,
            user_icon: row.user_icon,
        }
    }
}

/// Locally persisted identity and room pointers.
#[derive(Debug, Clone, Default)]
pub struct StoredPrefs {
    pub room_id: Option<String>,
    pub nickname: Option<String>,
    pub user_icon: Option<String>,
}
