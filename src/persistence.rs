//! Persistence gateway over a string key-value store.
//!
//! Reads are tolerant: a missing key, an unreadable store, or a blob that does
//! not decode into a consistent board all come back as "nothing stored".
//! `save` is best effort and only logs failures; `try_save` reports them.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::theme::ThemeMode;

pub const BOARD_KEY: &str = "kanban-data";
pub const THEME_KEY: &str = "theme";

const STORE_FILE_NAME: &str = "storage.json";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle after giving one to a gateway.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object of string values on disk, rewritten atomically on every set.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_local_dir()?;
        path.push("dnd-kanban");
        path.push(STORE_FILE_NAME);
        Some(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store '{}'", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse store '{}'", self.path.display()))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("invalid store path '{}'", self.path.display()))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create store directory '{}'", parent.display()))?;

        let contents =
            serde_json::to_string_pretty(entries).context("failed to serialize store entries")?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| anyhow!("invalid store file name '{}'", self.path.display()))?
            .to_string_lossy()
            .to_string();
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!("failed to write temporary store '{}'", tmp_path.display())
        })?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to rename store '{}' to '{}'",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // An unreadable file is replaced rather than blocking every later write.
        let mut entries = self.read_entries().unwrap_or_else(|error| {
            warn!("discarding unreadable store contents: {error:#}");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn load(&self) -> Option<Board> {
        let raw = match self.store.get(BOARD_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored board under '{BOARD_KEY}'");
                return None;
            }
            Err(error) => {
                warn!("failed to read stored board: {error:#}");
                return None;
            }
        };

        let board = match serde_json::from_str::<Board>(&raw) {
            Ok(board) => board,
            Err(error) => {
                warn!("stored board is not valid kanban data: {error}");
                return None;
            }
        };

        if !board.has_unique_ids() {
            warn!("stored board contains duplicate ids; ignoring it");
            return None;
        }

        Some(board)
    }

    pub fn load_or_seed(&self) -> Board {
        self.load().unwrap_or_else(|| {
            info!("starting from the default board");
            Board::seeded()
        })
    }

    /// An empty board is never written, so a board that has not finished
    /// loading cannot clobber what is on disk. Failures are logged and the
    /// in-memory board stays authoritative.
    pub fn save(&mut self, board: &Board) {
        if let Err(error) = self.try_save(board) {
            warn!("failed to save board: {error:#}");
        }
    }

    pub fn try_save(&mut self, board: &Board) -> Result<()> {
        if board.is_empty() {
            debug!("skipping save of empty board");
            return Ok(());
        }
        let encoded = serde_json::to_string(board).context("failed to encode board")?;
        self.store.set(BOARD_KEY, &encoded)
    }

    pub fn load_theme(&self) -> ThemeMode {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => ThemeMode::from_stored(&raw),
            Ok(None) => ThemeMode::default(),
            Err(error) => {
                warn!("failed to read stored theme: {error:#}");
                ThemeMode::default()
            }
        }
    }

    pub fn save_theme(&mut self, mode: ThemeMode) {
        if let Err(error) = self.store.set(THEME_KEY, mode.as_str()) {
            warn!("failed to save theme: {error:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Card, Column};

    fn sample_board() -> Board {
        Board::from_columns(vec![
            Column::new("x", "X", vec![Card::new("c1", "one"), Card::new("c2", "two")]),
            Column::new("y", "Y", Vec::new()),
        ])
    }

    #[test]
    fn test_load_missing_board() {
        let gateway = PersistenceGateway::new(MemoryStore::new());
        assert_eq!(gateway.load(), None);
        assert_eq!(gateway.load_or_seed(), Board::seeded());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let store = MemoryStore::new();
        let mut gateway = PersistenceGateway::new(store.clone());
        let board = sample_board();

        gateway.save(&board);

        assert!(store.raw(BOARD_KEY).is_some());
        assert_eq!(gateway.load(), Some(board));
    }

    #[test]
    fn test_save_skips_empty_board() {
        let store = MemoryStore::new().with_entry(BOARD_KEY, "[]");
        let mut gateway = PersistenceGateway::new(store.clone());

        gateway.save(&sample_board());
        gateway.save(&Board::default());

        let stored = store.raw(BOARD_KEY).expect("board stored");
        assert_ne!(stored, "[]");
        assert_eq!(gateway.load(), Some(sample_board()));
    }

    #[test]
    fn test_load_malformed_blob_falls_back_to_seed() {
        let gateway = PersistenceGateway::new(MemoryStore::new().with_entry(BOARD_KEY, "{not json"));
        assert_eq!(gateway.load(), None);
        assert_eq!(gateway.load_or_seed(), Board::seeded());
    }

    #[test]
    fn test_load_wrong_shape_is_rejected() {
        for raw in ["null", "{}", "[{\"id\":1}]", "\"text\""] {
            let gateway = PersistenceGateway::new(MemoryStore::new().with_entry(BOARD_KEY, raw));
            assert_eq!(gateway.load(), None, "blob {raw} should be rejected");
        }
    }

    #[test]
    fn test_load_duplicate_ids_is_rejected() {
        let raw = r#"[{"id":"a","title":"A","tasks":[{"id":"t","content":"x"}]},
                      {"id":"b","title":"B","tasks":[{"id":"t","content":"y"}]}]"#;
        let gateway = PersistenceGateway::new(MemoryStore::new().with_entry(BOARD_KEY, raw));
        assert_eq!(gateway.load(), None);
    }

    #[test]
    fn test_load_stored_empty_board() {
        let gateway = PersistenceGateway::new(MemoryStore::new().with_entry(BOARD_KEY, "[]"));
        assert_eq!(gateway.load(), Some(Board::default()));
    }

    #[test]
    fn test_theme_defaults_to_light() {
        let gateway = PersistenceGateway::new(MemoryStore::new());
        assert_eq!(gateway.load_theme(), ThemeMode::Light);

        let gateway = PersistenceGateway::new(MemoryStore::new().with_entry(THEME_KEY, "neon"));
        assert_eq!(gateway.load_theme(), ThemeMode::Light);
    }

    #[test]
    fn test_theme_roundtrip() {
        let store = MemoryStore::new();
        let mut gateway = PersistenceGateway::new(store.clone());

        gateway.save_theme(ThemeMode::Dark);

        assert_eq!(store.raw(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(gateway.load_theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_file_store_roundtrip() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join(STORE_FILE_NAME);
        let mut store = FileStore::new(&path);

        assert_eq!(store.get(BOARD_KEY)?, None);
        store.set(BOARD_KEY, "[]")?;
        store.set(THEME_KEY, "dark")?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(BOARD_KEY)?.as_deref(), Some("[]"));
        assert_eq!(reopened.get(THEME_KEY)?.as_deref(), Some("dark"));
        assert!(!path.with_file_name(".storage.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_file_store_recovers_from_corrupt_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join(STORE_FILE_NAME);
        fs::write(&path, "garbage")?;

        let mut store = FileStore::new(&path);
        assert!(store.get(THEME_KEY).is_err());

        let gateway = PersistenceGateway::new(store.clone());
        assert_eq!(gateway.load_theme(), ThemeMode::Light);
        assert_eq!(gateway.load_or_seed(), Board::seeded());

        store.set(THEME_KEY, "dark")?;
        assert_eq!(store.get(THEME_KEY)?.as_deref(), Some("dark"));
        Ok(())
    }
}
