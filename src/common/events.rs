use crate::common::types::{ChatMessage, User};

/// Events the session task sends up to the UI.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ConnectionReady,
    ConnectionClosed,
    /// Socket id the service assigned to this connection.
    IdentityAssigned(String),
    /// Entered a room; carries the room id and the reconciled message list
    /// (persisted history plus any synthetic join notice).
    RoomEntered {
        room_id: String,
        messages: Vec<ChatMessage>,
    },
    /// A persisted room id could not be rejoined; local room state has been
    /// cleared and the UI should fall back to the lobby.
    RejoinFailed { room_id: String },
    /// Create/join rejected by the service.
    RoomError(String),
    MessageReceived(ChatMessage),
    /// Locally synthesized notice (left/disconnected), session-transient.
    SystemNotice(ChatMessage),
    TypingPresence(Vec<String>),
    RosterUpdated(Vec<User>),
    SendFailed(String),
}
