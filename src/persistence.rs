// ABOUTME: Volume persistence bridge
// ABOUTME: Consent-gated key/value storage for the volume preference

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default key under which the volume is stored
pub const DEFAULT_VOLUME_KEY: &str = "radiocast.volume";

/// Simple string key/value storage
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`; failures are logged by the store
    fn set(&self, key: &str, value: &str);
}

/// Whether the user agreed to local persistence
pub trait ConsentSource: Send + Sync {
    /// Current consent state
    fn has_consent(&self) -> bool;
}

/// Shareable consent flag
#[derive(Debug, Clone, Default)]
pub struct ConsentFlag(Arc<AtomicBool>);

impl ConsentFlag {
    /// Flag with consent granted
    pub fn granted() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Flag with consent not (yet) granted
    pub fn denied() -> Self {
        Self::default()
    }

    /// Grant consent
    pub fn grant(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Withdraw consent
    pub fn revoke(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ConsentSource for ConsentFlag {
    fn has_consent(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.write().insert(key.to_string(), value.to_string());
    }
}

/// Store persisted as a flat JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file is missing or unreadable
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed state file {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!("Failed to read state file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename it over the state file
    fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, bytes)?;
        std::fs::rename(&temp_path, &self.path)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());

        let written = serde_json::to_string_pretty(&*values)
            .map_err(std::io::Error::from)
            .and_then(|json| self.write_atomic(json.as_bytes()));
        if let Err(e) = written {
            log::warn!("Failed to write state file {}: {}", self.path.display(), e);
        }
    }
}

/// Reads and writes the persisted volume preference.
///
/// Writes are dropped while consent is not granted; reads are always
/// allowed and clamp the stored value into `[0, 1]`.
#[derive(Clone)]
pub struct VolumeStore {
    store: Arc<dyn KeyValueStore>,
    consent: Arc<dyn ConsentSource>,
    key: String,
}

impl VolumeStore {
    /// Bridge `store`, gated by `consent`
    pub fn new(store: Arc<dyn KeyValueStore>, consent: Arc<dyn ConsentSource>) -> Self {
        Self {
            store,
            consent,
            key: DEFAULT_VOLUME_KEY.to_string(),
        }
    }

    /// Use a different storage key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Persisted volume, clamped into `[0, 1]`
    pub fn load(&self) -> Option<f64> {
        let raw = self.store.get(&self.key)?;
        match raw.trim().parse::<f64>() {
            Ok(volume) if volume.is_finite() => Some(volume.clamp(0.0, 1.0)),
            _ => {
                log::warn!("Ignoring invalid stored volume {:?}", raw);
                None
            }
        }
    }

    /// Persist `volume` if consent was granted
    pub fn save(&self, volume: f64) {
        if !self.consent.has_consent() {
            log::debug!("Volume not persisted: no storage consent");
            return;
        }
        self.store.set(&self.key, &volume.to_string());
    }
}
