//! Registry and cache test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use update_notifier::config::NotifierConfig;
use update_notifier::notifier::{Notifier, RunningNotifier};
use update_notifier::pubsub::LocalBus;
use update_notifier::version::cache::{FileSnapshot, VersionCache};
use update_notifier::version::error::RegistryError;
use update_notifier::version::registry::Registry;
use update_notifier::version::types::PackageMetadata;

/// Mock registry for testing
pub struct MockRegistry {
    packages: HashMap<String, PackageMetadata>,
    requests: Mutex<Vec<String>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latest(mut self, package: &str, version: &str) -> Self {
        self.packages.insert(
            package.to_string(),
            PackageMetadata::with_dist_tags(
                package,
                HashMap::from([("latest".to_string(), version.to_string())]),
            ),
        );
        self
    }

    /// Registers a package whose document has no dist tags
    pub fn without_dist_tags(mut self, package: &str) -> Self {
        self.packages.insert(
            package.to_string(),
            PackageMetadata::with_dist_tags(package, HashMap::new()),
        );
        self
    }

    /// Package names requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_latest(&self, package_name: &str) -> Result<PackageMetadata, RegistryError> {
        if package_name.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "No module name was given as argument".to_string(),
            ));
        }
        self.requests.lock().unwrap().push(package_name.to_string());

        match self.packages.get(package_name) {
            Some(metadata) => Ok(metadata.clone()),
            None => Err(RegistryError::MalformedResponse(format!(
                "no document for {}",
                package_name
            ))),
        }
    }
}

/// Create a module registry file and an unloaded cache reading it
pub fn create_test_cache(entries: &[(&str, &str)]) -> (TempDir, Arc<VersionCache>) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("module-registry.json");

    let registry: HashMap<&str, &str> = entries.iter().copied().collect();
    std::fs::write(&path, serde_json::to_string(&registry).unwrap()).unwrap();

    let cache = VersionCache::new(Box::new(FileSnapshot::new(&path)));
    (temp_dir, Arc::new(cache))
}

/// Build a notifier on the given bus and subscribe it to its check channel
pub async fn start_notifier(
    registry: Arc<MockRegistry>,
    cache: Arc<VersionCache>,
    bus: Arc<LocalBus>,
    config: NotifierConfig,
) -> RunningNotifier {
    let notifier = Arc::new(Notifier::new(registry, cache, bus.clone(), bus, config));
    notifier.start().await.unwrap()
}
