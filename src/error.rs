use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Please provide the filename as an argument.")]
    Usage,
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Discord(#[from] DiscordError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Error reading file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("Discord API error {code} ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        code: i64,
        message: String,
    },
    #[error("Discord rejected the bot token")]
    Unauthorized,
    #[error("session was not ready after {waited:?}")]
    ReadyTimeout { waited: std::time::Duration },
    #[error("Channel not found: {channel_id}")]
    ChannelNotFound { channel_id: String },
    #[error("message is {chars} characters, Discord accepts at most {limit}")]
    ContentTooLong { chars: usize, limit: usize },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("API base URL cannot be extended with {endpoint}")]
    Endpoint { endpoint: String },
}

impl From<reqwest::Error> for DiscordError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}

impl Error {
    /// Usage and ingestion failures abort before any network activity and
    /// still exit with status 0.
    pub const fn is_benign_abort(&self) -> bool {
        matches!(self, Self::Usage | Self::Ingest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Error, IngestError};

    #[test]
    fn usage_message_matches_operator_text() {
        assert_eq!(
            Error::Usage.to_string(),
            "Please provide the filename as an argument."
        );
    }

    #[test]
    fn only_usage_and_ingest_are_benign() {
        let ingest = Error::from(IngestError::Read {
            path: "missing.log".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(Error::Usage.is_benign_abort());
        assert!(ingest.is_benign_abort());
        let config = Error::from(ConfigError::MissingField {
            field: "discord.token",
        });
        assert!(!config.is_benign_abort());
    }
}
