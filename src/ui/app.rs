use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{SessionCommand, SessionEvent};
use crate::storage::models::StoredPrefs;

use super::components::{input_bar, lobby, message_list, roster, typing_indicator};
use super::state::AppState;

/// Idle time after the last keystroke before typing=false goes out.
const TYPING_IDLE_TIMEOUT: Duration = Duration::from_secs(3);
const NOTICE_TTL: Duration = Duration::from_secs(5);

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<SessionCommand>,
    event_receiver: mpsc::Receiver<SessionEvent>,
    /// Delay between regaining window focus and dialing, to avoid thrashing
    /// on rapid focus flips.
    reconnect_delay: Duration,
    reconnect_at: Option<Instant>,
    was_focused: bool,
    typing_deadline: Option<Instant>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<SessionCommand>,
        event_receiver: mpsc::Receiver<SessionEvent>,
        prefs: StoredPrefs,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            state: AppState::new(&prefs),
            command_sender,
            event_receiver,
            reconnect_delay,
            reconnect_at: None,
            was_focused: true,
            typing_deadline: None,
        }
    }

    fn handle_session_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                SessionEvent::ConnectionReady => {
                    self.state.connected = true;
                    self.reconnect_at = None;
                }
                SessionEvent::ConnectionClosed => {
                    self.state.connected = false;
                    self.state.reconnecting = false;
                    self.state.pending_room_op = false;
                    self.state.clear_presence();
                    self.typing_deadline = None;
                }
                SessionEvent::IdentityAssigned(socket_id) => {
                    self.state.current_user.socket_id = Some(socket_id);
                }
                SessionEvent::RoomEntered { room_id, messages } => {
                    self.state.current_user.nickname =
                        self.state.nickname_input.trim().to_string();
                    self.state.enter_room(room_id, messages);
                }
                SessionEvent::RejoinFailed { room_id } => {
                    self.state.leave_room();
                    self.state.pending_room_op = false;
                    self.state
                        .show_notice(format!("Couldn't rejoin room {room_id}"));
                }
                SessionEvent::RoomError(message) => {
                    self.state.pending_room_op = false;
                    self.state.show_notice(message);
                }
                SessionEvent::MessageReceived(message)
                | SessionEvent::SystemNotice(message) => {
                    self.state.push_message(message);
                }
                SessionEvent::TypingPresence(ids) => self.state.set_typing(ids),
                SessionEvent::RosterUpdated(users) => self.state.set_roster(users),
                SessionEvent::SendFailed(reason) => {
                    self.state
                        .show_notice(format!("Failed to send message: {reason}"));
                }
            }
        }
    }

    fn send_command(&mut self, command: SessionCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to session: {err}");
        }
    }

    /// Focus-regain reconnect: schedule one delayed attempt when the window
    /// becomes focused while disconnected. A pending schedule or an active
    /// connection absorbs further triggers.
    fn poll_reconnect(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if focused && !self.was_focused && !self.state.connected && self.reconnect_at.is_none() {
            self.reconnect_at = Some(Instant::now() + self.reconnect_delay);
        }
        self.was_focused = focused;

        if let Some(at) = self.reconnect_at {
            if Instant::now() >= at {
                self.reconnect_at = None;
                if !self.state.connected {
                    log::info!("Window focus regained; attempting reconnect");
                    self.send_command(SessionCommand::Reconnect);
                }
            }
        }
    }

    fn note_typing_activity(&mut self) {
        if self.typing_deadline.is_none() {
            self.send_command(SessionCommand::SetTyping(true));
        }
        self.typing_deadline = Some(Instant::now() + TYPING_IDLE_TIMEOUT);
    }

    fn poll_typing_idle(&mut self) {
        if let Some(deadline) = self.typing_deadline {
            if Instant::now() >= deadline {
                self.typing_deadline = None;
                self.send_command(SessionCommand::SetTyping(false));
            }
        }
    }

    fn stop_typing(&mut self) {
        if self.typing_deadline.take().is_some() {
            self.send_command(SessionCommand::SetTyping(false));
        }
    }

    fn create_room(&mut self) {
        let nickname = self.state.nickname_input.trim().to_string();
        if nickname.is_empty() {
            self.state.show_notice("A nickname is required to create a chat room");
            return;
        }
        let user_icon = icon_field(&self.state.icon_input);
        self.state.pending_room_op = true;
        self.send_command(SessionCommand::CreateRoom {
            nickname,
            user_icon,
        });
    }

    fn join_room(&mut self) {
        let nickname = self.state.nickname_input.trim().to_string();
        let room_id = self.state.join_room_input.trim().to_string();
        if nickname.is_empty() || room_id.is_empty() {
            self.state
                .show_notice("Please enter both nickname and room ID");
            return;
        }
        let user_icon = icon_field(&self.state.icon_input);
        self.state.pending_room_op = true;
        self.send_command(SessionCommand::JoinRoom {
            nickname,
            room_id,
            user_icon,
        });
    }

    fn leave_room(&mut self) {
        self.send_command(SessionCommand::Leave);
        self.state.leave_room();
    }

    fn render_lobby(&mut self, ctx: &egui::Context) {
        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let actions = lobby::render(ui, &mut self.state);
                if let Some(notice) = &self.state.notice {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::LIGHT_RED, &notice.text);
                }
                actions
            })
            .inner;

        if actions.create {
            self.create_room();
        }
        if actions.join {
            self.join_room();
        }
        if actions.retry_connection {
            self.send_command(SessionCommand::Reconnect);
        }
    }

    fn render_room(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("roster_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                roster::render(ui, &self.state);
            });

        let mut leave = false;
        let mut retry = false;
        let connected = self.state.connected;

        let input_actions = egui::TopBottomPanel::bottom("composer")
            .show(ctx, |ui| {
                typing_indicator::render(ui, &self.state);
                if !connected && !self.state.reconnecting {
                    ui.horizontal(|ui| {
                        ui.colored_label(
                            egui::Color32::LIGHT_RED,
                            "Connection lost. Messages cannot be sent.",
                        );
                        if ui.small_button("Reconnect").clicked() {
                            retry = true;
                        }
                    });
                }
                input_bar::render(ui, &mut self.state.input_text, connected)
            })
            .inner;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chat Room");
                ui.label(format!("Welcome, {}!", self.state.current_user.nickname));
                if ui.button("Leave").clicked() {
                    leave = true;
                }
            });
            if self.state.reconnecting {
                ui.colored_label(egui::Color32::YELLOW, "Rejoining your room...");
            }
            if let Some(notice) = &self.state.notice {
                ui.colored_label(egui::Color32::LIGHT_RED, &notice.text);
            }
            ui.separator();
            message_list::render(ui, &self.state.messages);
        });

        if let Some(body) = input_actions.submitted {
            self.send_command(SessionCommand::SendChat { body });
            self.stop_typing();
        } else if input_actions.edited {
            self.note_typing_activity();
        }
        if retry {
            self.send_command(SessionCommand::Reconnect);
        }
        if leave {
            self.leave_room();
        }
    }
}

fn icon_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_session_events();
        self.poll_reconnect(ctx);
        self.poll_typing_idle();

        if let Some(notice) = &self.state.notice {
            if notice.created.elapsed() > NOTICE_TTL {
                self.state.notice = None;
            }
        }

        if self.state.room_id.is_some() {
            self.render_room(ctx);
        } else {
            self.render_lobby(ctx);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
