use eframe::egui;

use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let Some(text) = typing_text(state) else {
        return;
    };
    ui.label(egui::RichText::new(text).small().weak());
}

fn typing_text(state: &AppState) -> Option<String> {
    let typing = state.typing_users();
    match typing.len() {
        0 => None,
        1 => Some(format!("{} is typing...", typing[0].nickname)),
        2 => Some(format!(
            "{} and {} are typing...",
            typing[0].nickname, typing[1].nickname
        )),
        n => Some(format!("{n} people are typing...")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::User;
    use crate::storage::models::StoredPrefs;

    fn roster_user(nickname: &str, socket_id: &str) -> User {
        User {
            nickname: nickname.to_string(),
            user_icon: None,
            socket_id: Some(socket_id.to_string()),
        }
    }

    fn state_with_typing(typing: &[&str]) -> AppState {
        let mut state = AppState::new(&StoredPrefs::default());
        state.current_user.socket_id = Some("me".to_string());
        state.set_roster(vec![
            roster_user("Bob", "s1"),
            roster_user("Eve", "s2"),
            roster_user("Mallory", "s3"),
        ]);
        state.set_typing(typing.iter().map(|s| s.to_string()).collect());
        state
    }

    #[test]
    fn nobody_typing_renders_nothing() {
        assert!(typing_text(&state_with_typing(&[])).is_none());
    }

    #[test]
    fn singular_and_plural_phrasing() {
        assert_eq!(
            typing_text(&state_with_typing(&["s1"])).unwrap(),
            "Bob is typing..."
        );
        assert_eq!(
            typing_text(&state_with_typing(&["s1", "s2"])).unwrap(),
            "Bob and Eve are typing..."
        );
        assert_eq!(
            typing_text(&state_with_typing(&["s1", "s2", "s3"])).unwrap(),
            "3 people are typing..."
        );
    }

    #[test]
    fn own_id_in_server_set_is_ignored() {
        let state = state_with_typing(&["me", "s1"]);
        assert_eq!(typing_text(&state).unwrap(), "Bob is typing...");
    }
}
