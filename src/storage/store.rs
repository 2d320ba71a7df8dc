use rusqlite::{params, OptionalExtension, Result as SqlResult};
use std::path::Path;

use super::database::Database;
use super::models::{MessageRow, StoredPrefs};
use crate::common::types::ChatMessage;

pub const ROOM_ID_KEY: &str = "chat_room_id";
pub const NICKNAME_KEY: &str = "user_nickname";
pub const USER_ICON_KEY: &str = "user_icon";

/// Local store for message history and identity prefs. One database per
/// profile (origin-scoped keys; there is no per-tab analogue on the desktop).
pub struct ChatStore {
    db: Database,
}

impl ChatStore {
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let db = Database::new(path)?;
        let store = Self { db };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> SqlResult<Self> {
        let db = Database::in_memory()?;
        let store = Self { db };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = self.db.connection();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id TEXT NOT NULL,
                body TEXT NOT NULL,
                perm_id TEXT,
                timestamp INTEGER NOT NULL,
                user_nickname TEXT,
                user_icon TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prefs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_room_time
             ON messages(room_id, timestamp)",
            [],
        )?;

        Ok(())
    }

    // ========== History ==========

    /// Persist a message for a room. System messages are session-transient
    /// and are rejected here; returns whether the row was stored.
    pub fn insert_message(&self, room_id: &str, message: &ChatMessage) -> SqlResult<bool> {
        if message.is_system_message {
            return Ok(false);
        }
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO messages (room_id, body, perm_id, timestamp, user_nickname, user_icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                room_id,
                message.body,
                message.perm_id,
                message.timestamp,
                message.user_nickname,
                message.user_icon
            ],
        )?;
        Ok(true)
    }

    /// History for one room, ascending by timestamp.
    pub fn messages_for_room(&self, room_id: &str) -> SqlResult<Vec<ChatMessage>> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, room_id, body, perm_id, timestamp, user_nickname, user_icon
             FROM messages
             WHERE room_id = ?1
             ORDER BY timestamp ASC",
        )?;

        let rows = stmt
            .query_map(params![room_id], |row| {
                Ok(MessageRow {
                    id: row.get(0)?,
                    room_id: row.get(1)?,
                    body: row.get(2)?,
                    perm_id: row.get(3)?,
                    timestamp: row.get(4)?,
                    user_nickname: row.get(5)?,
                    user_icon: row.get(6)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    pub fn message_count(&self, room_id: &str) -> SqlResult<usize> {
        let conn = self.db.connection();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE room_id = ?1",
            params![room_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ========== Preferences ==========

    pub fn set_pref(&self, key: &str, value: &str) -> SqlResult<()> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT OR REPLACE INTO prefs (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_pref(&self, key: &str) -> SqlResult<Option<String>> {
        let conn = self.db.connection();
        conn.query_row(
            "SELECT value FROM prefs WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn clear_pref(&self, key: &str) -> SqlResult<()> {
        let conn = self.db.connection();
        conn.execute("DELETE FROM prefs WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Load room id and identity in one shot for session startup.
    pub fn load_prefs(&self) -> SqlResult<StoredPrefs> {
        Ok(StoredPrefs {
            room_id: self.get_pref(ROOM_ID_KEY)?,
            nickname: self.get_pref(NICKNAME_KEY)?,
            user_icon: self.get_pref(USER_ICON_KEY)?,
        })
    }

    pub fn save_identity(&self, nickname: &str, user_icon: Option<&str>) -> SqlResult<()> {
        self.set_pref(NICKNAME_KEY, nickname)?;
        match user_icon {
            Some(icon) => self.set_pref(USER_ICON_KEY, icon)?,
            None => self.clear_pref(USER_ICON_KEY)?,
        }
        Ok(())
    }

    pub fn save_room_id(&self, room_id: &str) -> SqlResult<()> {
        self.set_pref(ROOM_ID_KEY, room_id)
    }

    /// Dropping the room id is what turns the next startup into a plain
    /// connect instead of a rejoin.
    pub fn clear_room_id(&self) -> SqlResult<()> {
        self.clear_pref(ROOM_ID_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{ChatMessage, User};

    fn plain_message(body: &str, nickname: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            is_system_message: false,
            body: body.to_string(),
            perm_id: Some("p".to_string()),
            timestamp,
            user_nickname: Some(nickname.to_string()),
            user_icon: None,
        }
    }

    #[test]
    fn system_messages_are_never_persisted() {
        let store = ChatStore::in_memory().unwrap();
        let user = User::new("Alice");
        let system = ChatMessage::system("joined the party", Some(&user));

        assert!(!store.insert_message("room", &system).unwrap());
        assert!(store.insert_message("room", &plain_message("hi", "Alice", 1)).unwrap());

        let history = store.messages_for_room("room").unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.iter().all(|m| !m.is_system_message));
    }

    #[test]
    fn history_is_ascending_by_timestamp_and_scoped_to_room() {
        let store = ChatStore::in_memory().unwrap();
        store.insert_message("a", &plain_message("second", "Bob", 200)).unwrap();
        store.insert_message("a", &plain_message("first", "Bob", 100)).unwrap();
        store.insert_message("b", &plain_message("other room", "Bob", 50)).unwrap();

        let history = store.messages_for_room("a").unwrap();
        let bodies: Vec<_> = history.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
        assert_eq!(store.message_count("b").unwrap(), 1);
    }

    #[test]
    fn prefs_round_trip_and_clear() {
        let store = ChatStore::in_memory().unwrap();
        store.save_room_id("abc123").unwrap();
        store.save_identity("Alice", Some("https://tiny.url/x")).unwrap();

        let prefs = store.load_prefs().unwrap();
        assert_eq!(prefs.room_id.as_deref(), Some("abc123"));
        assert_eq!(prefs.nickname.as_deref(), Some("Alice"));
        assert_eq!(prefs.user_icon.as_deref(), Some("https://tiny.url/x"));

        store.clear_room_id().unwrap();
        store.save_identity("Alice", None).unwrap();
        let prefs = store.load_prefs().unwrap();
        assert!(prefs.room_id.is_none());
        assert!(prefs.user_icon.is_none());
    }

    #[test]
    fn history_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        {
            let store = ChatStore::with_path(&path).unwrap();
            store.insert_message("room", &plain_message("kept", "Alice", 1)).unwrap();
            let user = User::new("Alice");
            store
                .insert_message("room", &ChatMessage::system("joined the party", Some(&user)))
                .unwrap();
        }
        let store = ChatStore::with_path(&path).unwrap();
        let history = store.messages_for_room("room").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].body, "kept");
    }
}
