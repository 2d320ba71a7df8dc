use crate::common::types::{ChatMessage, User};

pub const JOINED_BODY: &str = "joined the party";
pub const CREATED_BODY: &str = "created the party";
pub const LEFT_BODY: &str = "left";

/// How far back in loaded history to look for an earlier self-join notice.
const RECENT_WINDOW: usize = 10;

/// Result of merging persisted history with the (re)join moment.
#[derive(Debug)]
pub struct Reconciled {
    pub messages: Vec<ChatMessage>,
    pub appended_join: bool,
}

/// Merge persisted room history with the current (re)join. A synthetic
/// "joined the party" notice is appended only on a fresh join with no
/// matching self-join notice in the last `RECENT_WINDOW` entries; a
/// same-session rejoin reuses the loaded history unmodified.
pub fn merge_history(mut history: Vec<ChatMessage>, user: &User, rejoining: bool) -> Reconciled {
    let recent_join = history.iter().rev().take(RECENT_WINDOW).any(|message| {
        message.is_system_message
            && message.body == JOINED_BODY
            && message.user_nickname.as_deref() == Some(user.nickname.as_str())
    });

    if rejoining || recent_join {
        return Reconciled {
            messages: history,
            appended_join: false,
        };
    }

    history.push(ChatMessage::system(JOINED_BODY, Some(user)));
    Reconciled {
        messages: history,
        appended_join: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(body: &str, nickname: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            is_system_message: false,
            body: body.to_string(),
            perm_id: None,
            timestamp,
            user_nickname: Some(nickname.to_string()),
            user_icon: None,
        }
    }

    fn joined(nickname: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            is_system_message: true,
            body: JOINED_BODY.to_string(),
            perm_id: Some("system".to_string()),
            timestamp,
            user_nickname: Some(nickname.to_string()),
            user_icon: None,
        }
    }

    #[test]
    fn fresh_join_appends_notice_and_keeps_history_order() {
        let history = vec![plain("a", "Bob", 1), plain("b", "Bob", 2)];
        let merged = merge_history(history, &User::new("Alice"), false);

        assert!(merged.appended_join);
        assert_eq!(merged.messages.len(), 3);
        let bodies: Vec<_> = merged.messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies[..2], ["a", "b"]);
        let last = merged.messages.last().unwrap();
        assert!(last.is_system_message);
        assert_eq!(last.user_nickname.as_deref(), Some("Alice"));
    }

    #[test]
    fn rejoin_reuses_history_unmodified() {
        let history = vec![plain("a", "Bob", 1)];
        let merged = merge_history(history.clone(), &User::new("Alice"), true);
        assert!(!merged.appended_join);
        assert_eq!(merged.messages, history);
    }

    #[test]
    fn recent_matching_join_suppresses_duplicate() {
        let mut history: Vec<ChatMessage> = Vec::new();
        history.push(joined("Alice", 5));
        for t in 6..10 {
            history.push(plain("chatter", "Bob", t));
        }
        let merged = merge_history(history, &User::new("Alice"), false);
        assert!(!merged.appended_join);
    }

    #[test]
    fn join_notice_older_than_window_does_not_count() {
        let mut history = vec![joined("Alice", 0)];
        for t in 1..=10 {
            history.push(plain("chatter", "Bob", t));
        }
        let merged = merge_history(history, &User::new("Alice"), false);
        assert!(merged.appended_join);
    }

    #[test]
    fn join_notice_for_other_nickname_does_not_count() {
        let history = vec![joined("Mallory", 5)];
        let merged = merge_history(history, &User::new("Alice"), false);
        assert!(merged.appended_join);
        assert_eq!(merged.messages.len(), 2);
    }
}
