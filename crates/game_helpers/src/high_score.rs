use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HIGH_SCORE_KEY: &str = "highscore";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Integer key-value settings storage.
pub trait HighScoreStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<u32>;
    fn set(&mut self, key: &str, value: u32);
    /// Makes previous `set` calls durable.
    fn flush(&mut self) -> Result<(), StorageError>;
}

/// Volatile store, used when nothing should touch the disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, u32>,
}

impl MemoryStore {
    pub fn with_value(key: &str, value: u32) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_owned(), value);
        store
    }
}

impl HighScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u32> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_owned(), value);
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(flatten)]
    values: BTreeMap<String, u32>,
}

/// Settings kept as a flat JSON object, e.g. `{"highscore": 400}`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    settings: SettingsFile,
}

impl JsonFileStore {
    /// Reads `path` if it exists; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StorageError::Format {
                    path: path.clone(),
                    source,
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SettingsFile::default(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<u32> {
        self.settings.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u32) {
        self.settings.values.insert(key.to_owned(), value);
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let contents =
            serde_json::to_string_pretty(&self.settings).map_err(|source| StorageError::Format {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, contents).map_err(io_error)
    }
}

/// The best score seen so far, backed by a store.
///
/// `best` never decreases. A failed flush is logged and the in-memory value stays
/// authoritative for the rest of the session.
#[derive(Resource)]
pub struct HighScore {
    best: u32,
    store: Box<dyn HighScoreStore>,
}

impl HighScore {
    pub fn load(store: impl HighScoreStore) -> Self {
        let best = store.get(HIGH_SCORE_KEY).unwrap_or(0);
        tracing::info!(best, "loaded high score");
        Self {
            best,
            store: Box::new(store),
        }
    }

    pub const fn best(&self) -> u32 {
        self.best
    }

    /// Records `score`, writing and flushing only when it beats the stored best.
    /// Returns the best score afterwards.
    pub fn submit(&mut self, score: u32) -> u32 {
        if score > self.best {
            self.best = score;
            self.store.set(HIGH_SCORE_KEY, score);
            match self.store.flush() {
                Ok(()) => tracing::info!(score, "new high score saved"),
                Err(err) => tracing::warn!("new high score {score} not saved: {err}"),
            }
        }
        self.best
    }
}

impl core::fmt::Debug for HighScore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HighScore").field("best", &self.best).finish_non_exhaustive()
    }
}
