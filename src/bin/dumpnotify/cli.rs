use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(author, version, about = "Posts database dump reports to Discord", long_about = None)]
pub struct Cli {
    /// Dump report files, relative to the dump directory.
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the report files are read from.
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Log what would be sent instead of contacting Discord.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Use a JSON layer for logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "dumpnotify=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn files_keep_argument_order() {
        let cli = Cli::parse_from(["dumpnotify", "--dry-run", "b.log", "a.log"]);
        assert_eq!(cli.files, vec!["b.log", "a.log"]);
        assert!(cli.dry_run);
    }

    #[test]
    fn no_files_is_not_a_parse_error() {
        let cli = Cli::try_parse_from(["dumpnotify"]).unwrap();
        assert!(cli.files.is_empty());
    }
}
