use std::path::PathBuf;

/// Failure while fetching an alert icon. Always logged and degraded to "no icon".
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Icon request to {url} failed with status {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("Failed to write icon to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid trigger time '{0}': expected HH:MM:SS")]
    InvalidTriggerTime(String),
    #[error("No trigger times configured")]
    NoTriggerTimes,
    #[error("'{0}' must be greater than zero")]
    ZeroDuration(&'static str),
}
