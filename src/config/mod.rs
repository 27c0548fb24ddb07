use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::{ConfigError, Error};
use crate::report::Outcome;

mod defaults;
mod duration;
mod env;
mod raw;

use self::duration::HumantimeDuration;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone)]
pub struct DiscordSettings {
    pub api_base: Url,
    pub token: Option<SecretString>,
    pub destinations: Destinations,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub ready_timeout: Duration,
}

/// Channel ids for the two fixed destinations.
///
/// Either id may be absent. It is only needed once there is something to send
/// to that destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations {
    pub success: Option<String>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub dump_dir: PathBuf,
    pub title: String,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(Error::from)?;
        raw.apply_env_overrides().map_err(Error::from)?;
        raw.validate_and_build()
    }
}

impl Destinations {
    /// Channel id configured for `outcome`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the channel key when that
    /// destination has no id.
    pub fn channel_for(&self, outcome: Outcome) -> Result<&str> {
        let (channel, field) = match outcome {
            Outcome::Succeeded => (&self.success, "discord.channel_success"),
            Outcome::Failed => (&self.failure, "discord.channel_failed"),
        };
        channel
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField { field }.into())
    }
}

impl DiscordSettings {
    /// The bot token is only required once a session is opened.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no token was configured.
    pub fn token(&self) -> Result<&SecretString> {
        self.token
            .as_ref()
            .ok_or_else(|| ConfigError::MissingField { field: "discord.token" }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{Destinations, DiscordSettings};
    use crate::error::{ConfigError, Error};
    use crate::report::Outcome;
    use std::time::Duration;
    use url::Url;

    fn settings(token: Option<&str>) -> DiscordSettings {
        DiscordSettings {
            api_base: Url::parse("https://discord.com/api/v10").unwrap(),
            token: token.map(Into::into),
            destinations: Destinations {
                success: Some("1".into()),
                failure: Some("2".into()),
            },
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
            ready_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn token_is_checked_at_use() {
        let err = settings(None).token().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "discord.token" })
        ));
        assert!(settings(Some("abc")).token().is_ok());
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", settings(Some("super-secret-token")));
        assert!(!rendered.contains("super-secret-token"));
    }

    #[test]
    fn each_channel_is_checked_on_its_own() {
        let destinations = Destinations {
            success: None,
            failure: Some("2".into()),
        };
        assert_eq!(destinations.channel_for(Outcome::Failed).unwrap(), "2");
        let err = destinations.channel_for(Outcome::Succeeded).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField {
                field: "discord.channel_success"
            })
        ));
    }
}
