use futures::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::net::wire::{ClientFrame, ServerFrame};
use crate::session::error::SessionError;

const CHANNEL_CAPACITY: usize = 100;

/// Channel-pair handle over one live connection to the chat service. The
/// session owns at most one of these at a time; dropping it tears the
/// connection down (the write pump closes the socket when the outbound
/// channel goes dead).
pub struct SocketHandle {
    pub outbound: mpsc::Sender<ClientFrame>,
    pub inbound: mpsc::Receiver<ServerFrame>,
}

impl SocketHandle {
    /// Build a handle from raw channel halves. Tests use this to stand in a
    /// fake service without a socket.
    pub fn from_channels(
        outbound: mpsc::Sender<ClientFrame>,
        inbound: mpsc::Receiver<ServerFrame>,
    ) -> Self {
        Self { outbound, inbound }
    }

    pub fn channel_pair() -> (Self, mpsc::Receiver<ClientFrame>, mpsc::Sender<ServerFrame>) {
        let (out_tx, out_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (in_tx, in_rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self::from_channels(out_tx, in_rx), out_rx, in_tx)
    }
}

/// Seam between the session and the transport: production dials a WebSocket,
/// tests hand back an in-memory channel pair.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, url: String) -> BoxFuture<'static, Result<SocketHandle, SessionError>>;
}

/// Production connector over tokio-tungstenite. Two pump tasks translate
/// frames to and from JSON text messages; either pump exiting ends the other
/// via the channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: String) -> BoxFuture<'static, Result<SocketHandle, SessionError>> {
        Box::pin(async move {
            let (stream, _response) = connect_async(url.as_str()).await?;
            log::info!("Connected to chat service at {url}");

            let (mut sink, mut source) = stream.split();
            let (out_tx, mut out_rx) = mpsc::channel::<ClientFrame>(CHANNEL_CAPACITY);
            let (in_tx, in_rx) = mpsc::channel::<ServerFrame>(CHANNEL_CAPACITY);

            tokio::spawn(async move {
                while let Some(frame) = out_rx.recv().await {
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(err) => {
                            log::warn!("Failed to serialize outbound frame: {err}");
                            continue;
                        }
                    };
                    if let Err(err) = sink.send(Message::Text(text)).await {
                        log::warn!("Socket write failed: {err}");
                        break;
                    }
                }
                // Outbound channel dead: the handle was dropped. Close politely.
                let _ = sink.send(Message::Close(None)).await;
            });

            tokio::spawn(async move {
                while let Some(message) = source.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ServerFrame>(&text) {
                                Ok(frame) => {
                                    if in_tx.send(frame).await.is_err() {
                                        break;
                                    }
                                }
                                Err(err) => {
                                    log::debug!("Dropping unrecognized frame: {err}");
                                }
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            log::warn!("Socket read failed: {err}");
                            break;
                        }
                    }
                }
                // in_tx drops here; the session observes recv() -> None as close.
            });

            Ok(SocketHandle::from_channels(out_tx, in_rx))
        })
    }
}
