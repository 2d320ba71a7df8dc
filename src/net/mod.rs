pub mod socket;
pub mod wire;

pub use socket::{Connector, SocketHandle, WsConnector};
