use std::time::Instant;

use crate::common::types::{ChatMessage, User};
use crate::storage::models::StoredPrefs;

/// Transient, user-visible notice (send failure, room error). Expires after
/// a few seconds.
pub struct Notice {
    pub text: String,
    pub created: Instant,
}

/// Local session state mirrored for the UI. Two views only: Lobby while
/// `room_id` is None, Room once it is set.
pub struct AppState {
    pub connected: bool,
    /// True from startup-with-persisted-room until the rejoin resolves.
    pub reconnecting: bool,
    pub room_id: Option<String>,
    pub current_user: User,
    pub messages: Vec<ChatMessage>,
    pub roster: Vec<User>,
    pub users_typing: Vec<String>,
    pub notice: Option<Notice>,

    // Lobby form
    pub nickname_input: String,
    pub icon_input: String,
    pub join_room_input: String,
    pub pending_room_op: bool,

    // Composer
    pub input_text: String,
}

impl AppState {
    pub fn new(prefs: &StoredPrefs) -> Self {
        Self {
            connected: false,
            reconnecting: prefs.room_id.is_some(),
            room_id: prefs.room_id.clone(),
            current_user: {
                let mut user = User::default();
                if let Some(nickname) = &prefs.nickname {
                    user.nickname = nickname.clone();
                }
                user.user_icon = prefs.user_icon.clone();
                user
            },
            messages: Vec::new(),
            roster: Vec::new(),
            users_typing: Vec::new(),
            notice: None,
            nickname_input: prefs.nickname.clone().unwrap_or_default(),
            icon_input: prefs.user_icon.clone().unwrap_or_default(),
            join_room_input: String::new(),
            pending_room_op: false,
            input_text: String::new(),
        }
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn enter_room(&mut self, room_id: String, messages: Vec<ChatMessage>) {
        self.room_id = Some(room_id);
        self.messages = messages;
        self.reconnecting = false;
        self.pending_room_op = false;
    }

    pub fn leave_room(&mut self) {
        self.room_id = None;
        self.messages.clear();
        self.roster.clear();
        self.users_typing.clear();
        self.reconnecting = false;
    }

    pub fn set_roster(&mut self, users: Vec<User>) {
        self.roster = users;
    }

    /// Disconnect invariant: roster and typing set go empty whatever they
    /// held before.
    pub fn clear_presence(&mut self) {
        self.roster.clear();
        self.users_typing.clear();
    }

    pub fn set_typing(&mut self, ids: Vec<String>) {
        let own = self.current_user.socket_id.clone();
        self.users_typing = ids
            .into_iter()
            .filter(|id| Some(id) != own.as_ref())
            .collect();
    }

    /// Roster users matching the current typing set, for the indicator line.
    pub fn typing_users(&self) -> Vec<&User> {
        self.users_typing
            .iter()
            .filter_map(|id| {
                self.roster
                    .iter()
                    .find(|user| user.socket_id.as_deref() == Some(id.as_str()))
            })
            .collect()
    }

    pub fn show_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            created: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(&StoredPrefs::default())
    }

    fn message(body: &str) -> ChatMessage {
        ChatMessage {
            is_system_message: false,
            body: body.to_string(),
            perm_id: None,
            timestamp: 0,
            user_nickname: Some("Bob".to_string()),
            user_icon: None,
        }
    }

    #[test]
    fn messages_keep_arrival_order() {
        let mut state = state();
        for body in ["one", "two", "three"] {
            state.push_message(message(body));
        }
        let bodies: Vec<_> = state.messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[test]
    fn typing_set_excludes_own_socket_id() {
        let mut state = state();
        state.current_user.socket_id = Some("me".to_string());
        state.set_typing(vec!["me".to_string(), "them".to_string()]);
        assert_eq!(state.users_typing, vec!["them"]);
    }

    #[test]
    fn clear_presence_empties_roster_and_typing() {
        let mut state = state();
        state.set_roster(vec![User::new("Bob"), User::new("Eve")]);
        state.set_typing(vec!["a".to_string()]);
        state.clear_presence();
        assert!(state.roster.is_empty());
        assert!(state.users_typing.is_empty());
    }

    #[test]
    fn persisted_room_starts_in_reconnecting_room_view() {
        let prefs = StoredPrefs {
            room_id: Some("abc123".to_string()),
            nickname: Some("Alice".to_string()),
            user_icon: None,
        };
        let state = AppState::new(&prefs);
        assert!(state.reconnecting);
        assert_eq!(state.room_id.as_deref(), Some("abc123"));
        assert_eq!(state.nickname_input, "Alice");
    }

    #[test]
    fn leave_room_returns_to_lobby_and_drops_room_state() {
        let mut state = state();
        state.enter_room("abc123".to_string(), vec![message("hello")]);
        state.set_roster(vec![User::new("Bob")]);
        state.leave_room();
        assert!(state.room_id.is_none());
        assert!(state.messages.is_empty());
        assert!(state.roster.is_empty());
    }
}
