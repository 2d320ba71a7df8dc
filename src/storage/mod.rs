pub mod database;
pub mod models;
pub mod store;

pub use store::ChatStore;

use std::fs;
use std::path::Path;

/// Ensure the profile data directory exists
pub fn ensure_data_dir<P: AsRef<Path>>(dir: P) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
