use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};

#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use crate::version::error::CacheError;
use crate::version::semver::is_newer;
use crate::version::types::VersionedModule;

/// Durable source of the module registry document
#[cfg_attr(test, automock)]
pub trait SnapshotSource: Send + Sync {
    /// Read the raw module registry document
    fn read(&self) -> Result<String, CacheError>;
}

/// Module registry stored as a JSON file on disk
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl SnapshotSource for FileSnapshot {
    fn read(&self) -> Result<String, CacheError> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| CacheError::RegistryLoad(format!("{}: {}", self.path.display(), e)))
    }
}

/// In-memory mapping from package name to its last known published version
///
/// Populated once from a [`SnapshotSource`]. Lookups never perform I/O.
pub struct VersionCache {
    source: Box<dyn SnapshotSource>,
    load_lock: Mutex<()>,
    snapshot: OnceLock<HashMap<String, String>>,
    /// Versions announced since startup, when remembering is enabled
    observed: Option<RwLock<HashMap<String, String>>>,
}

impl VersionCache {
    pub fn new(source: Box<dyn SnapshotSource>) -> Self {
        Self {
            source,
            load_lock: Mutex::new(()),
            snapshot: OnceLock::new(),
            observed: None,
        }
    }

    /// Keep versions passed to [`VersionCache::record`] on top of the snapshot
    pub fn remember_notified(mut self) -> Self {
        self.observed = Some(RwLock::new(HashMap::new()));
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.get().is_some()
    }

    /// Load the module registry. Does nothing if it is already loaded.
    pub fn load(&self) -> Result<(), CacheError> {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_loaded() {
            debug!("Module registry already loaded, skipping");
            return Ok(());
        }

        let raw = self.source.read()?;
        let entries = Self::parse(&raw)?;
        info!("Loaded module registry with {} packages", entries.len());

        // load_lock guarantees we are the only writer
        let _ = self.snapshot.set(entries);
        Ok(())
    }

    fn parse(raw: &str) -> Result<HashMap<String, String>, CacheError> {
        serde_json::from_str::<HashMap<String, String>>(raw)
            .map_err(|e| CacheError::RegistryLoad(format!("invalid module registry: {}", e)))
    }

    /// Last known version of a package, or None if it is unknown
    pub fn get(&self, package_name: &str) -> Option<String> {
        if let Some(observed) = &self.observed {
            let observed = observed.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(version) = observed.get(package_name) {
                return Some(version.clone());
            }
        }

        self.snapshot.get()?.get(package_name).cloned()
    }

    /// Remember a version that has just been announced
    ///
    /// Ignored unless remembering is enabled. An entry is never replaced by a
    /// version that orders before it. Returns true if the entry changed.
    pub fn record(&self, module: &VersionedModule) -> bool {
        let Some(observed) = &self.observed else {
            return false;
        };

        let current = self.get(&module.name);
        let mut observed = observed.write().unwrap_or_else(PoisonError::into_inner);

        // Re-read under the write lock; another check may have advanced it
        let current = observed.get(&module.name).cloned().or(current);
        if let Some(current) = current
            && !is_newer(&module.version, &current)
        {
            debug!(
                "Keeping {}@{} over {}",
                module.name, current, module.version
            );
            return false;
        }

        observed.insert(module.name.clone(), module.version.clone());
        true
    }

    /// Number of packages in the loaded snapshot
    pub fn len(&self) -> usize {
        self.snapshot.get().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
