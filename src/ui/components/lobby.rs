use eframe::egui;

use crate::ui::state::AppState;

/// What the lobby wants done this frame.
#[derive(Debug, Default)]
pub struct LobbyActions {
    pub create: bool,
    pub join: bool,
    pub retry_connection: bool,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> LobbyActions {
    let mut actions = LobbyActions::default();

    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.heading("Partyline");
        ui.label("Connect with friends in real-time");
        ui.add_space(16.0);
    });

    ui.group(|ui| {
        ui.label("Nickname");
        ui.text_edit_singleline(&mut state.nickname_input);

        ui.add_space(6.0);
        ui.label("Profile image URL (optional)");
        ui.text_edit_singleline(&mut state.icon_input);

        ui.add_space(12.0);
        ui.separator();

        let has_nickname = !state.nickname_input.trim().is_empty();
        let busy = state.pending_room_op;

        ui.add_space(6.0);
        if ui
            .add_enabled(
                has_nickname && !busy,
                egui::Button::new(if busy { "Working..." } else { "Create Chat Room" }),
            )
            .clicked()
        {
            actions.create = true;
        }

        ui.add_space(10.0);
        ui.label("Room ID");
        ui.text_edit_singleline(&mut state.join_room_input);
        let has_room = !state.join_room_input.trim().is_empty();
        if ui
            .add_enabled(has_nickname && has_room && !busy, egui::Button::new("Join Chat Room"))
            .clicked()
        {
            actions.join = true;
        }
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.label("Status:");
        if state.connected {
            ui.colored_label(egui::Color32::GREEN, "Connected");
        } else {
            ui.colored_label(egui::Color32::YELLOW, "Connecting...");
            if ui.small_button("Retry").clicked() {
                actions.retry_connection = true;
            }
        }
    });

    actions
}
