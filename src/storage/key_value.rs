use std::{
    collections::HashMap,
    fmt::Display,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, error, warn};

/// Collections persisted by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Sessions,
    Projects,
    Clients,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Sessions => "sessions",
            StoreKey::Projects => "projects",
            StoreKey::Clients => "clients",
        }
    }
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Durable mirror of the application state. Neither operation reports failures: a missing or
/// unreadable value loads as `fallback`, and a failed write is only logged.
pub trait KeyValueStore {
    fn load<T: DeserializeOwned>(&self, key: StoreKey, fallback: T) -> impl Future<Output = T>;

    fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> impl Future<Output = ()>;
}

/// Stores each key as a JSON document `<key>.json` inside a directory.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }

    async fn read_inner(path: &Path) -> Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result?;
        Ok(Some(content))
    }

    async fn write_inner(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .await?;

        // Truncation happens only once the lock is held so readers never see a half written file.
        file.lock_exclusive()?;
        let result: Result<(), std::io::Error> = async {
            file.set_len(0).await?;
            file.write_all(content).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
}

impl KeyValueStore for JsonFileStore {
    async fn load<T: DeserializeOwned>(&self, key: StoreKey, fallback: T) -> T {
        let path = self.path_for(key);
        debug!("Loading {key} from {path:?}");
        match Self::read_inner(&path).await {
            Ok(Some(content)) => match serde_json::from_str::<T>(&content) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Stored {key} in {path:?} is corrupted, using defaults: {e}");
                    fallback
                }
            },
            Ok(None) => {
                debug!("Nothing stored for {key} yet");
                fallback
            }
            Err(e) => {
                warn!("Failed to read {key} from {path:?}, using defaults: {e}");
                fallback
            }
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) {
        let path = self.path_for(key);
        let content = match serde_json::to_vec_pretty(value) {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to serialize {key}: {e}");
                return;
            }
        };
        match Self::write_inner(&path, &content).await {
            Ok(()) => debug!("Saved {key} into {path:?}"),
            Err(e) => error!("Failed to save {key} into {path:?}: {e}"),
        }
    }
}

/// Keeps serialized values in memory. Values still go through JSON so behaviour matches
/// [JsonFileStore].
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: StoreKey) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned()
    }

    pub fn insert_raw(&self, key: StoreKey, content: impl Into<String>) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, content.into());
    }
}

impl KeyValueStore for MemoryStore {
    async fn load<T: DeserializeOwned>(&self, key: StoreKey, fallback: T) -> T {
        let Some(content) = self.raw(key) else {
            return fallback;
        };
        serde_json::from_str::<T>(&content)
            .inspect_err(|e| warn!("Stored {key} is corrupted, using defaults: {e}"))
            .unwrap_or(fallback)
    }

    async fn save<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(content) => self.insert_raw(key, content),
            Err(e) => error!("Failed to serialize {key}: {e}"),
        }
    }
}
