use std::path::Path;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use partyline::config;
use partyline::net::WsConnector;
use partyline::session::ChatSession;
use partyline::storage::{self, models::StoredPrefs, ChatStore};
use partyline::ui::ChatApp;

#[derive(Parser)]
#[command(name = "partyline", version, about = "Desktop chat client for the partyline room service")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Override the chat service WebSocket URL from the config file
    #[arg(long, value_name = "URL")]
    service_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(url) = cli.service_url {
        app_config.service_url = url;
    }

    if let Err(err) = storage::ensure_data_dir(&app_config.data_dir) {
        log::warn!("Failed to create data dir {}: {err}", app_config.data_dir);
    }
    let db_path = Path::new(&app_config.data_dir).join("chat.db");
    let store = match ChatStore::with_path(&db_path) {
        Ok(store) => store,
        Err(err) => {
            // History won't survive a restart, but the session still works.
            log::error!("Failed to open {}: {err}; falling back to in-memory store", db_path.display());
            ChatStore::in_memory().expect("in-memory sqlite should always open")
        }
    };
    let startup_prefs = store.load_prefs().unwrap_or_else(|err| {
        log::warn!("Failed to load stored prefs: {err}");
        StoredPrefs::default()
    });

    // UI -> session
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // session -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let session = ChatSession::new(
        Box::new(WsConnector),
        store,
        event_tx,
        app_config.service_url.clone(),
        app_config.shorten_endpoint.clone(),
    );
    tokio::spawn(session.run(cmd_rx));

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let reconnect_delay = Duration::from_millis(app_config.reconnect_delay_ms);

    eframe::run_native(
        "Partyline",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Client started against {}", app_config.service_url);

            Ok(Box::new(ChatApp::new(
                cc,
                cmd_tx.clone(),
                event_receiver,
                startup_prefs.clone(),
                reconnect_delay,
            )))
        }),
    )
}
