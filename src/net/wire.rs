use serde::{Deserialize, Serialize};

use crate::common::types::{ChatMessage, TypingData, User, DEFAULT_NICKNAME};

/// Frames this client sends to the chat service. JSON text frames of the
/// shape `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        nickname: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_icon: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        nickname: String,
        room_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_icon: Option<String>,
    },
    SendMessage { body: String },
    SetTypingPresence { typing: bool },
}

/// Frames the chat service delivers. Unknown message types are dropped by the
/// socket pump, so this enum only needs the taxonomy the session consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerFrame {
    #[serde(rename_all = "camelCase")]
    UserId { user_id: String },
    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: String },
    RoomJoined,
    SendMessage(ChatMessage),
    SetTypingPresence(TypingData),
    UserList(Vec<RosterEntry>),
    Error { message: String },
}

/// Roster snapshot entry as the service ships it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub user_settings: UserSettings,
    pub socket_connection_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<String>,
}

impl From<RosterEntry> for User {
    fn from(entry: RosterEntry) -> Self {
        User {
            nickname: entry
                .user_settings
                .user_nickname
                .unwrap_or_else(|| DEFAULT_NICKNAME.to_string()),
            user_icon: entry.user_settings.user_icon,
            socket_id: Some(entry.socket_connection_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_are_type_data_tagged() {
        let frame = ClientFrame::JoinRoom {
            nickname: "Alice".into(),
            room_id: "abc123".into(),
            user_icon: None,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "joinRoom");
        assert_eq!(json["data"]["roomId"], "abc123");
        assert!(json["data"].get("userIcon").is_none());
    }

    #[test]
    fn server_chat_frame_parses() {
        let raw = r#"{
            "type": "sendMessage",
            "data": {
                "body": "hello",
                "timestamp": 1700000000000,
                "userNickname": "Bob",
                "permId": "p1"
            }
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::SendMessage(msg) => {
                assert!(!msg.is_system_message);
                assert_eq!(msg.user_nickname.as_deref(), Some("Bob"));
                assert_eq!(msg.timestamp, 1_700_000_000_000);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn roster_entry_falls_back_to_guest() {
        let raw = r#"{
            "type": "userList",
            "data": [
                {"userSettings": {}, "socketConnectionId": "s1"},
                {"userSettings": {"userNickname": "Eve"}, "socketConnectionId": "s2"}
            ]
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        let ServerFrame::UserList(entries) = frame else {
            panic!("expected userList");
        };
        let users: Vec<User> = entries.into_iter().map(User::from).collect();
        assert_eq!(users[0].nickname, DEFAULT_NICKNAME);
        assert_eq!(users[1].nickname, "Eve");
        assert_eq!(users[1].socket_id.as_deref(), Some("s2"));
    }

    #[test]
    fn typing_presence_round_trips() {
        let raw = r#"{"type":"setTypingPresence","data":{"anyoneTyping":true,"usersTyping":["a","b"]}}"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        let ServerFrame::SetTypingPresence(data) = frame else {
            panic!("expected typing presence");
        };
        assert!(data.anyone_typing);
        assert_eq!(data.users_typing, vec!["a", "b"]);
    }
}
