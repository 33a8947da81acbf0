//! Version comparison between the cached and the freshly published version

use serde::Deserialize;

/// Result of comparing the registry's latest version with the cached one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCompareResult {
    /// Version known from the module registry snapshot (if any)
    pub cached_version: Option<String>,
    /// Latest version published on the registry
    pub latest_version: String,
    /// Update status
    pub status: UpdateStatus,
}

/// Status of a package relative to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Latest version equals the cached version
    Unchanged,
    /// Latest version differs from the cached version
    Updated,
    /// Package has no cache entry
    NotInCache,
}

/// What to do with a package that has no cache entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPackagePolicy {
    /// Treat it as not yet published and report it
    #[default]
    Notify,
    /// Stay quiet until the package appears in the module registry
    Suppress,
}

/// Whether an update event should be published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Notify,
    Suppress,
}

/// Compare the registry's latest version against the cached one
///
/// Any difference counts as an update; ordering is not consulted here.
pub fn compare_version(cached_version: Option<&str>, latest_version: &str) -> VersionCompareResult {
    let status = match cached_version {
        None => UpdateStatus::NotInCache,
        Some(cached) if cached == latest_version => UpdateStatus::Unchanged,
        Some(_) => UpdateStatus::Updated,
    };

    VersionCompareResult {
        cached_version: cached_version.map(|v| v.to_string()),
        latest_version: latest_version.to_string(),
        status,
    }
}

impl UpdateStatus {
    pub fn decide(self, policy: UnknownPackagePolicy) -> Decision {
        match (self, policy) {
            (UpdateStatus::Updated, _) => Decision::Notify,
            (UpdateStatus::Unchanged, _) => Decision::Suppress,
            (UpdateStatus::NotInCache, UnknownPackagePolicy::Notify) => Decision::Notify,
            (UpdateStatus::NotInCache, UnknownPackagePolicy::Suppress) => Decision::Suppress,
        }
    }
}
