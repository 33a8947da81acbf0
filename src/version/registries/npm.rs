//! npm registry API implementation

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::PackageMetadata;

/// Default base URL for npm registry
pub const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";

/// Default user agent sent with registry requests
pub const DEFAULT_USER_AGENT: &str = "update-notifier";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Registry implementation for npm registry API
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_user_agent(base_url, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(base_url: &str, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    /// Returns true if the header names the JSON media type, ignoring parameters
    fn is_json_content_type(content_type: &str) -> bool {
        content_type
            .split(';')
            .next()
            .map(|media_type| media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
            .unwrap_or(false)
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_latest(&self, package_name: &str) -> Result<PackageMetadata, RegistryError> {
        if package_name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "No module name was given as argument".to_string(),
            ));
        }

        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !Self::is_json_content_type(&content_type) {
            warn!(
                "npm registry returned content type {:?} for {}",
                content_type, url
            );
            return Err(RegistryError::MalformedResponse(format!(
                "Unexpected content type: {:?}",
                content_type
            )));
        }

        let body = response.text().await?;

        serde_json::from_str::<PackageMetadata>(&body).map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::MalformedResponse(e.to_string())
        })
    }
}
