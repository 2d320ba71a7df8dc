/// Commands the UI sends down to the session task.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Ask the service for a fresh room; the icon has already been run
    /// through the URL shortener.
    CreateRoom {
        nickname: String,
        user_icon: Option<String>,
    },
    JoinRoom {
        nickname: String,
        room_id: String,
        user_icon: Option<String>,
    },
    /// Plain or serialized rich-text body for the active room.
    SendChat { body: String },
    SetTyping(bool),
    /// Leave the active room, clear persisted room state and tear the
    /// connection down.
    Leave,
    /// Drop the current handle (if any) and dial again. Idempotent while an
    /// attempt is already in flight.
    Reconnect,
}
