use std::path::PathBuf;
use std::time::Duration;

pub(super) fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_ready_timeout() -> Duration {
    Duration::from_secs(30)
}

pub(super) fn default_dump_dir() -> PathBuf {
    PathBuf::from("../mongodump-output")
}

pub(super) fn default_title() -> String {
    "MongoDump".to_string()
}
