pub mod common;
pub mod config;
pub mod net;
pub mod session;
pub mod shorten;
pub mod storage;
pub mod ui;
