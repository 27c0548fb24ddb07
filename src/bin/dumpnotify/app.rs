use std::path::PathBuf;

use dumpnotify::Result;
use dumpnotify::config::Config;
use dumpnotify::delivery::{Delivery, DeliveryStatus, deliver_all, planned};
use dumpnotify::discord::DiscordClient;
use dumpnotify::error::Error;
use dumpnotify::report::{Digest, ingest};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "dumpnotify.toml";
const UNSET_CHANNEL: &str = "<unset>";

#[derive(Debug)]
pub struct RunSummary {
    pub run_id: String,
    pub files: usize,
    pub dry_run: bool,
    pub deliveries: Vec<Delivery>,
}

impl RunSummary {
    pub fn log(&self) {
        for delivery in &self.deliveries {
            if delivery.is_problem() {
                warn!(
                    run_id = %self.run_id,
                    outcome = %delivery.outcome,
                    channel_id = delivery.channel_id.as_deref().unwrap_or(UNSET_CHANNEL),
                    status = ?delivery.status,
                    "delivery incomplete"
                );
            }
        }
        let sent = self
            .deliveries
            .iter()
            .filter(|d| matches!(d.status, DeliveryStatus::Sent { .. }))
            .count();
        info!(
            run_id = %self.run_id,
            files = self.files,
            sent,
            dry_run = self.dry_run,
            "run finished"
        );
    }
}

pub async fn run(cli: Cli) -> Result<RunSummary> {
    if cli.files.is_empty() {
        return Err(Error::Usage);
    }

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_env_and_file(&config_path)?;
    if let Some(dir) = cli.dump_dir {
        config.report.dump_dir = dir;
    }

    let run_id = Uuid::now_v7().to_string();
    let span = info_span!("run", %run_id);
    execute(config, cli.files, cli.dry_run, run_id)
        .instrument(span)
        .await
}

async fn execute(
    config: Config,
    files: Vec<String>,
    dry_run: bool,
    run_id: String,
) -> Result<RunSummary> {
    let records = ingest(&config.report.dump_dir, files)?;
    let digest = Digest::build(&records, &config.report.title);
    let destinations = &config.discord.destinations;

    if dry_run {
        for (outcome, channel_id, body) in planned(&digest, destinations) {
            info!(
                %outcome,
                channel_id = channel_id.unwrap_or(UNSET_CHANNEL),
                chars = body.chars().count(),
                "dry-run: would send\n{body}"
            );
        }
        return Ok(RunSummary {
            run_id,
            files: records.len(),
            dry_run,
            deliveries: Vec::new(),
        });
    }

    let session = DiscordClient::new(&config.discord, &run_id)?.connect().await?;
    let deliveries = deliver_all(&session, &digest, destinations).await;
    session.close();

    Ok(RunSummary {
        run_id,
        files: records.len(),
        dry_run,
        deliveries,
    })
}
