//! Registry trait for looking up published package versions

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::PackageMetadata;

/// Trait for fetching package metadata from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the metadata document for a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "left-pad" or "@types/node")
    ///
    /// # Returns
    /// * `Ok(PackageMetadata)` - Parsed document including its dist tags
    /// * `Err(RegistryError)` - If the name is empty, the response is not a JSON
    ///   document, or the request fails
    async fn fetch_latest(&self, package_name: &str) -> Result<PackageMetadata, RegistryError>;
}
