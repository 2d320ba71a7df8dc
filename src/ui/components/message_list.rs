use chrono::{Local, TimeZone};
use eframe::egui;

use crate::common::types::ChatMessage;

pub fn render(ui: &mut egui::Ui, messages: &[ChatMessage]) {
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (index, message) in messages.iter().enumerate() {
                if message.is_system_message {
                    render_system(ui, message);
                } else {
                    render_chat(ui, message, show_user_info(messages, index));
                }
            }
        });
}

/// Consecutive messages from the same sender collapse their header line;
/// system messages always break the grouping.
fn show_user_info(messages: &[ChatMessage], index: usize) -> bool {
    if index == 0 {
        return true;
    }
    let current = &messages[index];
    let previous = &messages[index - 1];
    if current.is_system_message || previous.is_system_message {
        return true;
    }
    current.user_nickname != previous.user_nickname
}

fn render_system(ui: &mut egui::Ui, message: &ChatMessage) {
    ui.add_space(6.0);
    ui.vertical_centered(|ui| {
        let text = match &message.user_nickname {
            Some(nickname) => format!("{} {}", nickname, message.body),
            None => message.body.clone(),
        };
        ui.label(egui::RichText::new(text).italics().weak());
    });
}

fn render_chat(ui: &mut egui::Ui, message: &ChatMessage, with_header: bool) {
    ui.add_space(if with_header { 8.0 } else { 2.0 });
    if with_header {
        ui.horizontal(|ui| {
            let nickname = message.user_nickname.as_deref().unwrap_or("Anonymous");
            ui.label(egui::RichText::new(nickname).strong());
            ui.label(
                egui::RichText::new(format_timestamp(message.timestamp))
                    .small()
                    .weak(),
            );
        });
    }
    ui.label(&message.body);
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(time) => time.format("%H:%M").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(nickname: &str) -> ChatMessage {
        ChatMessage {
            is_system_message: false,
            body: "hi".to_string(),
            perm_id: None,
            timestamp: 0,
            user_nickname: Some(nickname.to_string()),
            user_icon: None,
        }
    }

    fn system() -> ChatMessage {
        ChatMessage {
            is_system_message: true,
            body: "joined the party".to_string(),
            perm_id: Some("system".to_string()),
            timestamp: 0,
            user_nickname: Some("Alice".to_string()),
            user_icon: None,
        }
    }

    #[test]
    fn consecutive_sender_messages_collapse_headers() {
        let messages = vec![chat("Bob"), chat("Bob"), chat("Eve")];
        assert!(show_user_info(&messages, 0));
        assert!(!show_user_info(&messages, 1));
        assert!(show_user_info(&messages, 2));
    }

    #[test]
    fn system_messages_break_grouping() {
        let messages = vec![chat("Bob"), system(), chat("Bob")];
        assert!(show_user_info(&messages, 1));
        assert!(show_user_info(&messages, 2));
    }
}
