mod cli;
mod config;
mod dataproc;
mod error;
mod logging;
mod storage;
mod ui;
mod waiter;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, WaitArgs};
use config::WatchConfig;
use dataproc::DataprocClient;
use error::WatchError;
use storage::StorageClient;
use waiter::JobWaiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = WatchConfig::load().context("failed to load configuration")?;
    if let Some(project) = cli.project.clone() {
        config.project_id = project;
    }
    if let Some(region) = cli.region.clone() {
        config.region = region;
    }

    run(cli, &config).await?;
    Ok(())
}

async fn run(cli: Cli, config: &WatchConfig) -> Result<(), WatchError> {
    let json = cli.json;
    let dataproc = DataprocClient::with_base_url(
        config.require_project()?.to_string(),
        config.region.clone(),
        config.access_token.clone(),
        config.dataproc_endpoint.clone(),
    )?;

    match cli.command {
        Command::Status { job_id } => {
            let job = dataproc
                .find_job(&job_id)
                .await?
                .ok_or(WatchError::JobNotFound(job_id))?;
            if json {
                ui::print_json(&job)?;
            } else {
                ui::print_job(&job);
            }
        }
        Command::Jobs { cluster, page_size } => {
            let jobs = dataproc.list_jobs(cluster.as_deref(), page_size).await?;
            if json {
                ui::print_json(&jobs)?;
            } else {
                ui::print_jobs(&jobs);
            }
        }
        Command::Clusters { name } => {
            let clusters = match name {
                Some(name) => vec![dataproc.get_cluster(&name).await?],
                None => dataproc.list_clusters().await?,
            };
            if json {
                ui::print_json(&clusters)?;
            } else {
                ui::print_clusters(&clusters);
            }
        }
        command @ (Command::Wait(_) | Command::Tail { .. }) => {
            if let Some(args) = command.into_wait_args() {
                wait(&dataproc, config, args, json).await?;
            }
        }
    }
    Ok(())
}

async fn wait(
    dataproc: &DataprocClient,
    config: &WatchConfig,
    args: WaitArgs,
    json: bool,
) -> Result<(), WatchError> {
    let storage =
        StorageClient::with_base_url(config.access_token.clone(), config.storage_endpoint.clone())?;

    let mut options = config.wait_options();
    options.goal = args.goal.into();
    options.stream_output = args.stream_output;
    if let Some(secs) = args.timeout {
        options.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(ms) = args.output_poll_ms {
        options.output_poll = Duration::from_millis(ms);
    }
    if let Some(ms) = args.status_poll_ms {
        options.status_poll = Duration::from_millis(ms);
    }

    let waiter = JobWaiter::new(dataproc, &storage, options);
    let mut progress = ui::WaitProgress::start(&args.job_id);
    let result = waiter.wait(&args.job_id, &mut progress).await;
    progress.finish(&result);

    let outcome = result?;
    if json {
        ui::print_json(&outcome.job)?;
    }
    Ok(())
}
