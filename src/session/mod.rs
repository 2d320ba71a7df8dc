pub mod client;
pub mod error;
pub mod reconcile;

pub use client::ChatSession;
pub use error::SessionError;
