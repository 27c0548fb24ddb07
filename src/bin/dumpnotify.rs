#[path = "dumpnotify/app.rs"]
mod app;
#[path = "dumpnotify/cli.rs"]
mod cli;

use std::error::Error as StdError;

use dumpnotify::error::Error;
use dumpnotify::telemetry::init_tracing;
use tracing::error;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Warning: ignoring .env file: {err}");
        }
    }

    let cli = cli::Cli::parse_args();
    if let Err(err) = init_tracing(cli.log_filter.as_deref(), cli.json_logs) {
        report_error(&err);
        return std::process::ExitCode::from(1);
    }

    match app::run(cli).await {
        Ok(summary) => {
            summary.log();
            std::process::ExitCode::SUCCESS
        }
        Err(err) if err.is_benign_abort() => {
            error!("{err}");
            report_error(&err);
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            std::process::ExitCode::from(1)
        }
    }
}

/// Printed on stderr whatever the log filter says.
fn report_error(err: &Error) {
    eprintln!("{}", headline(err));
    let mut source: Option<&dyn StdError> = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

// Benign aborts carry the operator diagnostic verbatim.
fn headline(err: &Error) -> String {
    if err.is_benign_abort() {
        err.to_string()
    } else {
        format!("Error: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::headline;
    use dumpnotify::error::{ConfigError, Error, IngestError};
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn usage_abort_prints_the_bare_diagnostic() {
        assert_eq!(
            headline(&Error::Usage),
            "Please provide the filename as an argument."
        );
    }

    #[test]
    fn ingest_abort_names_the_file() {
        let err = Error::Ingest(IngestError::Read {
            path: PathBuf::from("dumps/missing.log"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        let line = headline(&err);
        assert!(line.starts_with("Error reading file"), "{line}");
        assert!(line.contains("missing.log"), "{line}");
    }

    #[test]
    fn fatal_errors_are_prefixed() {
        let err = Error::Config(ConfigError::MissingField {
            field: "discord.token",
        });
        assert!(headline(&err).starts_with("Error: "));
    }
}
