use eframe::egui;

use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.heading(format!("In the room ({})", state.roster.len()));

    if let Some(room_id) = &state.room_id {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(room_id).monospace().small());
            if ui.small_button("Copy").clicked() {
                ui.ctx().copy_text(room_id.clone());
            }
        });
    }
    ui.separator();

    if state.roster.is_empty() {
        ui.label("Nobody here yet");
        return;
    }

    let own_id = state.current_user.socket_id.as_deref();
    for user in &state.roster {
        ui.horizontal(|ui| {
            let is_self = own_id.is_some() && user.socket_id.as_deref() == own_id;
            let label = if is_self {
                format!("{} (you)", user.nickname)
            } else {
                user.nickname.clone()
            };
            ui.label(label);
            if state
                .users_typing
                .iter()
                .any(|id| user.socket_id.as_deref() == Some(id.as_str()))
            {
                ui.label(egui::RichText::new("typing...").small().weak());
            }
        });
    }
}
