use thiserror::Error;

/// Failure taxonomy for the session layer. Nothing here is fatal to the
/// process; every variant degrades to a retryable UI state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("rejoin failed for room {room_id}: {reason}")]
    Rejoin { room_id: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for SessionError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SessionError::Connect(err.to_string())
    }
}
