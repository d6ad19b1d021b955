/// Central error type for tcgwatch.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("authentication failed against {host}: {message}")]
    AuthFailed { host: String, message: String },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("sentinel rarity '{name}' not found")]
    MissingSentinelRarity { name: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("credential error: {message}")]
    CredentialError { message: String },

    #[error("{0}")]
    Other(String),
}
