use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to load module registry: {0}")]
    RegistryLoad(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Channel {0} is closed")]
    ChannelClosed(String),

    #[error("Failed to publish on {channel}: {reason}")]
    Publish { channel: String, reason: String },

    #[error("Failed to subscribe to {channel}: {reason}")]
    Subscribe { channel: String, reason: String },
}

/// Failure of a single check-and-notify cycle
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Versions for module {0} could not be found")]
    ModuleVersionsNotFound(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to encode update payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
