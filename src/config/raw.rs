use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::{Host, Url};

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{
    default_api_base, default_connect_timeout, default_dump_dir, default_ready_timeout,
    default_request_timeout, default_title,
};
use super::env::{env_duration, env_string};
use super::{Config, Destinations, DiscordSettings, HumantimeDuration, ReportSettings};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(::config::Environment::with_prefix("DUMPNOTIFY").separator("__"));

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) discord: RawDiscord,
    #[serde(default)]
    pub(super) report: RawReport,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawDiscord {
    #[serde(default = "default_api_base")]
    pub(super) api_base: String,
    #[serde(default)]
    pub(super) token: Option<String>,
    #[serde(default)]
    pub(super) channel_success: Option<String>,
    #[serde(default)]
    pub(super) channel_failed: Option<String>,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) request_timeout: Duration,
    #[serde(default = "default_ready_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) ready_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawReport {
    #[serde(default = "default_dump_dir")]
    pub(super) dump_dir: PathBuf,
    #[serde(default = "default_title")]
    pub(super) title: String,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(token) = env_string("TOKEN")? {
            self.discord.token = Some(token);
        }
        if let Some(channel) = env_string("CHANNEL_SUCCESS")? {
            self.discord.channel_success = Some(channel);
        }
        if let Some(channel) = env_string("CHANNEL_FAILED")? {
            self.discord.channel_failed = Some(channel);
        }
        if let Some(base) = env_string("DISCORD_API_BASE")? {
            self.discord.api_base = base;
        }
        if let Some(timeout) = env_duration("DISCORD_CONNECT_TIMEOUT")? {
            self.discord.connect_timeout = timeout;
        }
        if let Some(timeout) = env_duration("DISCORD_REQUEST_TIMEOUT")? {
            self.discord.request_timeout = timeout;
        }
        if let Some(timeout) = env_duration("DISCORD_READY_TIMEOUT")? {
            self.discord.ready_timeout = timeout;
        }
        if let Some(dir) = env_string("DUMP_DIR")? {
            self.report.dump_dir = PathBuf::from(dir);
        }
        if let Some(title) = env_string("REPORT_TITLE")? {
            self.report.title = title;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let destinations = Destinations {
            success: channel_id(self.discord.channel_success),
            failure: channel_id(self.discord.channel_failed),
        };

        let token = match self.discord.token {
            Some(token) if token.trim().is_empty() => {
                return Err(ConfigError::InvalidField {
                    field: "discord.token",
                    message: "token cannot be empty".to_string(),
                }
                .into());
            }
            Some(token) => Some(token.trim().to_string().into()),
            None => None,
        };

        let api_base = parse_api_base(&self.discord.api_base)?;

        for (field, value) in [
            ("discord.connect_timeout", self.discord.connect_timeout),
            ("discord.request_timeout", self.discord.request_timeout),
            ("discord.ready_timeout", self.discord.ready_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidField {
                    field,
                    message: "timeout must be greater than zero".to_string(),
                }
                .into());
            }
        }

        if self.report.title.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "report.title",
                message: "title cannot be empty".to_string(),
            }
            .into());
        }

        Ok(Config {
            discord: DiscordSettings {
                api_base,
                token,
                destinations,
                connect_timeout: self.discord.connect_timeout,
                request_timeout: self.discord.request_timeout,
                ready_timeout: self.discord.ready_timeout,
            },
            report: ReportSettings {
                dump_dir: self.report.dump_dir,
                title: self.report.title,
            },
        })
    }
}

// Blank ids count as unset, matching how bare env overrides are read.
fn channel_id(value: Option<String>) -> Option<String> {
    value
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

fn parse_api_base(raw: &str) -> std::result::Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidField {
        field: "discord.api_base",
        message: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidField {
            field: "discord.api_base",
            message: "URL cannot be used as a base".to_string(),
        });
    }
    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback(&url) => Ok(url),
        other => Err(ConfigError::InvalidField {
            field: "discord.api_base",
            message: format!("scheme {other} is only accepted as https, or http on loopback"),
        }),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

impl Default for RawDiscord {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
            channel_success: None,
            channel_failed: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            ready_timeout: default_ready_timeout(),
        }
    }
}

impl Default for RawReport {
    fn default() -> Self {
        Self {
            dump_dir: default_dump_dir(),
            title: default_title(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Destinations, RawConfig, parse_api_base};
    use crate::error::{ConfigError, Error};
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    fn with_channels() -> RawConfig {
        let mut raw = RawConfig::default();
        raw.discord.channel_success = Some(" 1100 ".into());
        raw.discord.channel_failed = Some("2200".into());
        raw
    }

    #[test]
    fn defaults_follow_the_dump_layout() {
        let cfg = with_channels().validate_and_build().unwrap();
        assert_eq!(cfg.report.dump_dir, PathBuf::from("../mongodump-output"));
        assert_eq!(cfg.report.title, "MongoDump");
        assert_eq!(cfg.discord.api_base.as_str(), "https://discord.com/api/v10");
        assert_eq!(cfg.discord.destinations.success.as_deref(), Some("1100"));
        assert_eq!(cfg.discord.destinations.failure.as_deref(), Some("2200"));
        assert!(cfg.discord.token.is_none());
    }

    #[test]
    fn channels_are_optional_at_load() {
        let mut raw = with_channels();
        raw.discord.channel_success = None;
        raw.discord.channel_failed = Some("   ".into());
        let cfg = raw.validate_and_build().unwrap();
        assert_eq!(cfg.discord.destinations, Destinations::default());

        let cfg = RawConfig::default().validate_and_build().unwrap();
        assert!(cfg.discord.destinations.success.is_none());
    }

    #[test]
    fn blank_token_is_invalid() {
        let mut raw = with_channels();
        raw.discord.token = Some("   ".into());
        assert!(raw.validate_and_build().is_err());
    }

    #[test]
    fn zero_ready_timeout_is_invalid() {
        let mut raw = with_channels();
        raw.discord.ready_timeout = Duration::ZERO;
        let err = raw.validate_and_build().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidField {
                field: "discord.ready_timeout",
                ..
            })
        ));
    }

    #[test]
    fn plain_http_only_on_loopback() {
        assert!(parse_api_base("http://127.0.0.1:8080").is_ok());
        assert!(parse_api_base("http://localhost/api").is_ok());
        assert!(parse_api_base("http://discord.com/api/v10").is_err());
        assert!(parse_api_base("mailto:ops@example.com").is_err());
    }

    #[test]
    fn toml_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            br#"[discord]
channel_success = "10"
channel_failed = "20"
ready_timeout = "45s"

[report]
dump_dir = "/var/backups/dumps"
title = "PgDump"
"#,
        )
        .unwrap();

        let cfg = super::load(file.path())
            .unwrap()
            .validate_and_build()
            .unwrap();
        assert_eq!(cfg.discord.ready_timeout, Duration::from_secs(45));
        assert_eq!(cfg.report.dump_dir, PathBuf::from("/var/backups/dumps"));
        assert_eq!(cfg.report.title, "PgDump");
    }
}
