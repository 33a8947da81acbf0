//! Common types for version management

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Package document returned by the registry
///
/// Only the fields needed to detect a new release are kept. Everything else in
/// the registry document (versions, time, maintainers, ...) is ignored.
/// A `null` name, tag map or tag value reads the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Dist tags mapping tag names to versions (e.g., "latest" -> "4.17.21")
    #[serde(rename = "dist-tags", default, deserialize_with = "null_as_default")]
    pub dist_tags: HashMap<String, Option<String>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PackageMetadata {
    /// Creates metadata with the given dist tags
    pub fn with_dist_tags(name: &str, dist_tags: HashMap<String, String>) -> Self {
        Self {
            name: name.to_string(),
            dist_tags: dist_tags
                .into_iter()
                .map(|(tag, version)| (tag, Some(version)))
                .collect(),
        }
    }

    /// Resolve a dist tag to its version
    pub fn resolve_dist_tag(&self, tag: &str) -> Option<&str> {
        self.dist_tags.get(tag).and_then(|v| v.as_deref())
    }

    /// Returns the version published under the `latest` tag
    pub fn latest(&self) -> Option<&str> {
        self.resolve_dist_tag("latest").filter(|v| !v.is_empty())
    }
}

/// A package name paired with one of its versions
///
/// Used both for cache entries and as the update event payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedModule {
    pub name: String,
    pub version: String,
}

impl VersionedModule {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}
