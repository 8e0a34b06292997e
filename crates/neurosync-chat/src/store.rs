//! Durable history store: one JSON slot, whole-sequence rewrite on save

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use neurosync_ai::Message;

use crate::error::Result;
use crate::events::ChatEvent;

/// Fixed slot name. Changing it orphans previously saved history, so it is
/// defined exactly once.
pub const SLOT_NAME: &str = "NEURAL_SYNC_V1";

/// Boot banner used as the seed conversation
pub const SEED_BANNER: &str = "NEURAL_SYNC_X: ONLINE. ALL PROTOCOLS ACTIVE.";

/// Default single-message history used when the slot is absent or unreadable
pub fn seed_history() -> Vec<Message> {
    vec![Message::assistant(SEED_BANNER)]
}

/// Store for the conversation history.
///
/// Every save rewrites the full sequence; there is no delta or append-only
/// persistence. Routine saves are driven by the observer task from
/// [`HistoryStore::spawn_observer`]; the binary performs one final save
/// after stopping that task.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Store at the platform default slot location
    pub fn open_default() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neurosync");
        Self {
            path: dir.join(format!("{SLOT_NAME}.json")),
        }
    }

    /// Store at an explicit slot path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the slot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved sequence, falling back to the seed conversation when
    /// the slot is absent, unreadable, or malformed. Never fails visibly.
    pub fn load(&self) -> Vec<Message> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return seed_history(),
            Err(e) => {
                tracing::warn!("failed to read history slot: {e}");
                return seed_history();
            }
        };
        match serde_json::from_str(&data) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("history slot is malformed, resetting to seed: {e}");
                seed_history()
            }
        }
    }

    /// Overwrite the slot with the full sequence
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string(messages)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    /// Reset the slot to the seed conversation and return it
    pub fn reset(&self) -> Result<Vec<Message>> {
        let seed = seed_history();
        self.save(&seed)?;
        Ok(seed)
    }

    /// Spawn a task that mirrors every announced history snapshot into the
    /// slot, running until the event channel closes.
    ///
    /// The task yields only at the channel receive; an abort never lands
    /// inside a save. Callers that write the slot after shutdown must stop
    /// and await this task first.
    pub fn spawn_observer(&self, mut events: broadcast::Receiver<ChatEvent>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ChatEvent::HistoryChanged { messages }) => {
                        if let Err(e) = store.save(&messages) {
                            tracing::warn!("failed to persist transcript: {e}");
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        // Snapshots are self-contained, the next one catches up
                        tracing::debug!(skipped, "persistence observer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(dir.path().join(format!("{SLOT_NAME}.json")));
        (dir, store)
    }

    #[test]
    fn test_empty_slot_loads_seed() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load(), vec![Message::assistant(SEED_BANNER)]);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_dir, store) = temp_store();
        let messages = vec![
            Message::assistant(SEED_BANNER),
            Message::user("status?"),
            Message::assistant("ALL SYSTEMS NOMINAL."),
        ];
        store.save(&messages).unwrap();
        assert_eq!(store.load(), messages);
    }

    #[test]
    fn test_load_is_idempotent() {
        let (_dir, store) = temp_store();
        store.save(&[Message::user("once")]).unwrap();
        assert_eq!(store.load(), store.load());
    }

    #[test]
    fn test_save_of_load_is_noop() {
        let (_dir, store) = temp_store();
        store
            .save(&[Message::assistant(SEED_BANNER), Message::user("hi")])
            .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();
        store.save(&store.load()).unwrap();
        let after = fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_malformed_slot_resets_to_seed() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{definitely not json").unwrap();
        assert_eq!(store.load(), seed_history());
    }

    #[test]
    fn test_wrong_shape_resets_to_seed() {
        let (_dir, store) = temp_store();
        // An object where a sequence is expected
        fs::write(store.path(), r#"{"role": "user", "content": "x"}"#).unwrap();
        assert_eq!(store.load(), seed_history());
    }

    #[test]
    fn test_empty_sequence_is_valid_and_kept() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "[]").unwrap();
        assert_eq!(store.load(), Vec::<Message>::new());
    }

    #[test]
    fn test_reset_overwrites_with_seed() {
        let (_dir, store) = temp_store();
        store
            .save(&[Message::user("a"), Message::assistant("b")])
            .unwrap();
        let seed = store.reset().unwrap();
        assert_eq!(seed, seed_history());
        assert_eq!(store.load(), seed_history());
    }

    #[test]
    fn test_slot_format_matches_role_content_pairs() {
        let (_dir, store) = temp_store();
        // Hand-written slot content in the raw role/content shape
        fs::write(
            store.path(),
            r#"[{"role":"assistant","content":"NEURAL_SYNC_X: ONLINE. ALL PROTOCOLS ACTIVE."},{"role":"user","content":"hello"}]"#,
        )
        .unwrap();
        let messages = store.load();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), "assistant");
        assert_eq!(messages[1].content(), "hello");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::at(dir.path().join("nested/deeper/slot.json"));
        store.save(&seed_history()).unwrap();
        assert_eq!(store.load(), seed_history());
    }

    #[tokio::test]
    async fn test_observer_mirrors_snapshots_until_close() {
        let (_dir, store) = temp_store();
        let (tx, rx) = broadcast::channel(8);
        let task = store.spawn_observer(rx);

        let messages = vec![Message::assistant(SEED_BANNER), Message::user("hello")];
        tx.send(ChatEvent::TurnStarted).unwrap();
        tx.send(ChatEvent::HistoryChanged {
            messages: messages.clone(),
        })
        .unwrap();
        drop(tx);

        // Closing the channel drains the buffered events and ends the task
        task.await.unwrap();
        assert_eq!(store.load(), messages);
    }

    #[tokio::test]
    async fn test_stopped_observer_leaves_final_save_as_last_writer() {
        let (_dir, store) = temp_store();
        let (tx, rx) = broadcast::channel(8);
        let task = store.spawn_observer(rx);

        let newest = vec![Message::user("sync status"), Message::assistant("NOMINAL.")];
        tx.send(ChatEvent::HistoryChanged {
            messages: newest[..1].to_vec(),
        })
        .unwrap();

        // Shutdown order: stop the observer, then write the newest sequence
        task.abort();
        let _ = task.await;
        store.save(&newest).unwrap();

        assert_eq!(store.load(), newest);
    }
}
