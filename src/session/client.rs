use tokio::sync::mpsc;

use crate::common::types::{ChatMessage, User};
use crate::common::{SessionCommand, SessionEvent};
use crate::net::socket::{Connector, SocketHandle};
use crate::net::wire::{ClientFrame, ServerFrame};
use crate::session::error::SessionError;
use crate::session::reconcile::{merge_history, CREATED_BODY, LEFT_BODY};
use crate::shorten::shorten_avatar_url;
use crate::storage::models::StoredPrefs;
use crate::storage::ChatStore;

/// One in-flight room operation at a time; the next roomCreated/roomJoined/
/// error frame resolves it.
enum PendingRoomOp {
    Create {
        user: User,
    },
    Join {
        user: User,
        room_id: String,
        rejoin: bool,
    },
}

/// Connection lifecycle manager. Owns the single live socket handle, the
/// local store, and the session's view of identity and room membership.
/// Everything runs on one `tokio::select!` loop over UI commands and inbound
/// frames, so message order is exactly delivery order.
pub struct ChatSession {
    event_tx: mpsc::Sender<SessionEvent>,
    connector: Box<dyn Connector>,
    store: ChatStore,
    service_url: String,
    shorten_endpoint: String,
    user: User,
    room_id: Option<String>,
    pending: Option<PendingRoomOp>,
    connected: bool,
}

impl ChatSession {
    pub fn new(
        connector: Box<dyn Connector>,
        store: ChatStore,
        event_tx: mpsc::Sender<SessionEvent>,
        service_url: String,
        shorten_endpoint: String,
    ) -> Self {
        let prefs = store.load_prefs().unwrap_or_else(|err| {
            log::warn!("Failed to load stored prefs: {err}");
            StoredPrefs::default()
        });

        let mut user = User::default();
        if let Some(nickname) = prefs.nickname {
            user.nickname = nickname;
        }
        user.user_icon = prefs.user_icon;

        Self {
            event_tx,
            connector,
            store,
            service_url,
            shorten_endpoint,
            user,
            room_id: None,
            pending: None,
            connected: false,
        }
    }

    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<SessionCommand>) {
        let mut socket: Option<SocketHandle> = None;
        self.establish(&mut socket).await;
        log::info!("Session event loop started");

        loop {
            tokio::select! {
                command = cmd_rx.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command, &mut socket).await;
                }
                frame = next_inbound(&mut socket) => {
                    match frame {
                        Some(frame) => self.handle_frame(frame).await,
                        None => self.handle_closed(&mut socket).await,
                    }
                }
            }
        }
    }

    /// Dial the service, superseding any prior handle. A pending room
    /// operation on the old connection is discarded; if its reply ever
    /// arrived it would have no handle to arrive on.
    async fn establish(&mut self, socket: &mut Option<SocketHandle>) {
        socket.take();
        self.connected = false;
        self.pending = None;

        match self.connector.connect(self.service_url.clone()).await {
            Ok(handle) => {
                *socket = Some(handle);
                self.on_ready(socket).await;
            }
            Err(err) => {
                log::warn!("Connection attempt failed: {err}");
                let _ = self.event_tx.send(SessionEvent::ConnectionClosed).await;
            }
        }
    }

    async fn on_ready(&mut self, socket: &mut Option<SocketHandle>) {
        self.connected = true;
        let _ = self.event_tx.send(SessionEvent::ConnectionReady).await;

        let prefs = self.store.load_prefs().unwrap_or_else(|err| {
            log::warn!("Failed to load stored prefs: {err}");
            StoredPrefs::default()
        });
        if let (Some(room_id), Some(nickname)) = (prefs.room_id, prefs.nickname) {
            let user = User {
                nickname,
                user_icon: prefs.user_icon,
                socket_id: self.user.socket_id.clone(),
            };
            self.begin_join(user, room_id, true, socket).await;
        }
    }

    async fn handle_command(
        &mut self,
        command: SessionCommand,
        socket: &mut Option<SocketHandle>,
    ) {
        match command {
            SessionCommand::CreateRoom {
                nickname,
                user_icon,
            } => {
                self.ensure_connected(socket).await;
                let user = User {
                    nickname,
                    user_icon: self.prepare_icon(user_icon).await,
                    socket_id: self.user.socket_id.clone(),
                };
                self.remember_identity(&user);
                let frame = ClientFrame::CreateRoom {
                    nickname: user.nickname.clone(),
                    user_icon: user.user_icon.clone(),
                };
                if self.send_frame(socket, frame).await {
                    self.pending = Some(PendingRoomOp::Create { user });
                } else {
                    let _ = self
                        .event_tx
                        .send(SessionEvent::RoomError("connection not ready".to_string()))
                        .await;
                }
            }
            SessionCommand::JoinRoom {
                nickname,
                room_id,
                user_icon,
            } => {
                self.ensure_connected(socket).await;
                let user = User {
                    nickname,
                    user_icon: self.prepare_icon(user_icon).await,
                    socket_id: self.user.socket_id.clone(),
                };
                self.remember_identity(&user);
                self.begin_join(user, room_id, false, socket).await;
            }
            SessionCommand::SendChat { body } => {
                if !self.send_frame(socket, ClientFrame::SendMessage { body }).await {
                    let _ = self
                        .event_tx
                        .send(SessionEvent::SendFailed("connection lost".to_string()))
                        .await;
                }
            }
            SessionCommand::SetTyping(typing) => {
                if !self
                    .send_frame(socket, ClientFrame::SetTypingPresence { typing })
                    .await
                {
                    log::debug!("Typing update dropped: connection unavailable");
                }
            }
            SessionCommand::Leave => self.leave(socket).await,
            SessionCommand::Reconnect => self.establish(socket).await,
        }
    }

    async fn handle_frame(&mut self, frame: ServerFrame) {
        match frame {
            ServerFrame::UserId { user_id } => {
                self.user.socket_id = Some(user_id.clone());
                let _ = self
                    .event_tx
                    .send(SessionEvent::IdentityAssigned(user_id))
                    .await;
            }
            ServerFrame::RoomCreated { room_id } => {
                let Some(PendingRoomOp::Create { user }) = self.pending.take() else {
                    log::warn!("roomCreated frame with no pending create");
                    return;
                };
                self.adopt_identity(&user);
                let opening = vec![ChatMessage::system(CREATED_BODY, Some(&user))];
                self.enter_room(room_id, opening).await;
            }
            ServerFrame::RoomJoined => {
                let Some(PendingRoomOp::Join {
                    user,
                    room_id,
                    rejoin,
                }) = self.pending.take()
                else {
                    log::warn!("roomJoined frame with no pending join");
                    return;
                };
                self.adopt_identity(&user);
                let history = self.load_history(&room_id).unwrap_or_else(|err| {
                    log::warn!("Failed to load history for room {room_id}: {err}");
                    Vec::new()
                });
                let merged = merge_history(history, &user, rejoin);
                if merged.appended_join {
                    log::info!("Appended join notice for {}", user.nickname);
                }
                self.enter_room(room_id, merged.messages).await;
            }
            ServerFrame::SendMessage(message) => {
                let Some(room_id) = self.room_id.clone() else {
                    log::debug!("Dropping chat message outside any room");
                    return;
                };
                // Persist failure never blocks delivery to the UI.
                if let Err(err) = self.store.insert_message(&room_id, &message) {
                    log::warn!("Failed to persist message: {err}");
                }
                let _ = self
                    .event_tx
                    .send(SessionEvent::MessageReceived(message))
                    .await;
            }
            ServerFrame::SetTypingPresence(data) => {
                let own = self.user.socket_id.clone();
                let typing: Vec<String> = data
                    .users_typing
                    .into_iter()
                    .filter(|id| Some(id) != own.as_ref())
                    .collect();
                let _ = self.event_tx.send(SessionEvent::TypingPresence(typing)).await;
            }
            ServerFrame::UserList(entries) => {
                let users: Vec<User> = entries.into_iter().map(User::from).collect();
                let _ = self.event_tx.send(SessionEvent::RosterUpdated(users)).await;
            }
            ServerFrame::Error { message } => match self.pending.take() {
                Some(PendingRoomOp::Join {
                    room_id,
                    rejoin: true,
                    ..
                }) => self.fail_rejoin(room_id, &message).await,
                Some(_) => {
                    let _ = self.event_tx.send(SessionEvent::RoomError(message)).await;
                }
                None => log::warn!("Service error: {message}"),
            },
        }
    }

    async fn handle_closed(&mut self, socket: &mut Option<SocketHandle>) {
        socket.take();
        if !self.connected {
            return;
        }
        self.connected = false;
        self.pending = None;

        if self.room_id.is_some() {
            let notice = ChatMessage::system(LEFT_BODY, Some(&self.user));
            let _ = self.event_tx.send(SessionEvent::SystemNotice(notice)).await;
        }
        let _ = self.event_tx.send(SessionEvent::ConnectionClosed).await;
    }

    async fn leave(&mut self, socket: &mut Option<SocketHandle>) {
        socket.take();
        self.connected = false;
        self.pending = None;
        self.room_id = None;
        if let Err(err) = self.store.clear_room_id() {
            log::warn!("Failed to clear stored room id: {err}");
        }
        let _ = self.event_tx.send(SessionEvent::ConnectionClosed).await;
        let notice = ChatMessage::system("Disconnected from chat service", None);
        let _ = self.event_tx.send(SessionEvent::SystemNotice(notice)).await;
    }

    async fn begin_join(
        &mut self,
        user: User,
        room_id: String,
        rejoin: bool,
        socket: &mut Option<SocketHandle>,
    ) {
        let frame = ClientFrame::JoinRoom {
            nickname: user.nickname.clone(),
            room_id: room_id.clone(),
            user_icon: user.user_icon.clone(),
        };
        if self.send_frame(socket, frame).await {
            self.pending = Some(PendingRoomOp::Join {
                user,
                room_id,
                rejoin,
            });
        } else if rejoin {
            self.fail_rejoin(room_id, "connection unavailable").await;
        } else {
            let _ = self
                .event_tx
                .send(SessionEvent::RoomError("connection not ready".to_string()))
                .await;
        }
    }

    async fn enter_room(&mut self, room_id: String, messages: Vec<ChatMessage>) {
        if let Err(err) = self.store.save_room_id(&room_id) {
            log::warn!("Failed to persist room id: {err}");
        }
        self.room_id = Some(room_id.clone());
        let _ = self
            .event_tx
            .send(SessionEvent::RoomEntered { room_id, messages })
            .await;
    }

    fn load_history(&self, room_id: &str) -> Result<Vec<ChatMessage>, SessionError> {
        Ok(self.store.messages_for_room(room_id)?)
    }

    async fn fail_rejoin(&mut self, room_id: String, reason: &str) {
        let err = SessionError::Rejoin {
            room_id: room_id.clone(),
            reason: reason.to_string(),
        };
        log::warn!("{err}");
        self.room_id = None;
        if let Err(err) = self.store.clear_room_id() {
            log::warn!("Failed to clear stored room id: {err}");
        }
        let _ = self.event_tx.send(SessionEvent::RejoinFailed { room_id }).await;
    }

    async fn ensure_connected(&mut self, socket: &mut Option<SocketHandle>) {
        if !self.connected || socket.is_none() {
            self.establish(socket).await;
        }
    }

    async fn send_frame(&mut self, socket: &mut Option<SocketHandle>, frame: ClientFrame) -> bool {
        let Some(handle) = socket.as_ref() else {
            return false;
        };
        handle.outbound.send(frame).await.is_ok()
    }

    /// Long avatar URLs go through the shorten proxy before riding along on
    /// create/join; failures fall back to the original URL.
    async fn prepare_icon(&mut self, user_icon: Option<String>) -> Option<String> {
        match user_icon {
            Some(url) => Some(shorten_avatar_url(&self.shorten_endpoint, &url).await),
            None => None,
        }
    }

    fn adopt_identity(&mut self, user: &User) {
        self.user.nickname = user.nickname.clone();
        self.user.user_icon = user.user_icon.clone();
    }

    fn remember_identity(&mut self, user: &User) {
        if let Err(err) = self
            .store
            .save_identity(&user.nickname, user.user_icon.as_deref())
        {
            log::warn!("Failed to persist identity: {err}");
        }
    }
}

async fn next_inbound(socket: &mut Option<SocketHandle>) -> Option<ServerFrame> {
    match socket.as_mut() {
        Some(handle) => handle.inbound.recv().await,
        None => std::future::pending().await,
    }
}
