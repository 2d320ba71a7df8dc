use eframe::egui;

/// What the composer produced this frame.
#[derive(Debug, Default)]
pub struct InputActions {
    pub submitted: Option<String>,
    /// The text changed; the caller owes the service a typing=true signal.
    pub edited: bool,
}

pub fn render(ui: &mut egui::Ui, input_text: &mut String, enabled: bool) -> InputActions {
    let mut actions = InputActions::default();
    let mut send = false;

    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(input_text)
                .hint_text("Type a message")
                .desired_width(ui.available_width() - 60.0),
        );
        if response.changed() {
            actions.edited = true;
        }
        if ui.add_enabled(enabled, egui::Button::new("Send")).clicked() {
            send = true;
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if send && !input_text.trim().is_empty() {
        let message = input_text.trim().to_string();
        input_text.clear();
        actions.submitted = Some(message);
    }

    actions
}
