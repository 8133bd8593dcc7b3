use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_config::{ConfigLoad, ConfigLoader, ConfigWarnings};
use vigil_worker::{
    InactivityJobPayload, JobName, WorkerContext, backfill_inactivity,
    run_inactivity_job,
};

#[derive(Parser, Debug)]
#[command(name = "vigil-worker")]
#[command(about = "Sends inactivity notices to volunteers who have gone quiet")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
struct ConfigArgs {
    /// Path to a vigil.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a .env file loaded before reading the environment
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the inactivity job once
    Run(RunArgs),
    /// Run the inactivity job for every day in an inclusive date range
    Backfill(BackfillArgs),
    /// Apply database migrations and exit
    Migrate,
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Reference date (YYYY-MM-DD or RFC 3339); defaults to now
    #[arg(long, conflicts_with = "payload")]
    start_date: Option<String>,

    /// Job payload as JSON, e.g. '{"startDate":"2024-03-15"}'
    #[arg(long)]
    payload: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct BackfillArgs {
    /// First day to run (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// Last day to run, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let context = bootstrap(&cli.config).await?;

    match cli.command {
        Command::Run(args) => run(&context, args).await,
        Command::Backfill(args) => {
            let summary =
                backfill_inactivity(&context.notifier, args.from, args.to)
                    .await?;
            info!(
                days = summary.days,
                sent = summary.sent.total(),
                "backfill succeeded"
            );
            Ok(())
        }
        Command::Migrate => {
            context.migrate().await?;
            info!("Database migrations applied successfully");
            Ok(())
        }
    }
}

async fn run(context: &WorkerContext, args: RunArgs) -> anyhow::Result<()> {
    let payload = match (args.payload, args.start_date) {
        (Some(raw), _) => InactivityJobPayload::from_json(&raw)
            .context("failed to parse job payload")?,
        (None, start_date) => InactivityJobPayload { start_date },
    };

    info!(
        job = %JobName::EmailVolunteerInactive,
        start_date = payload.start_date().unwrap_or("now"),
        "starting job"
    );
    run_inactivity_job(&context.notifier, payload.start_date()).await?;
    Ok(())
}

async fn bootstrap(args: &ConfigArgs) -> anyhow::Result<WorkerContext> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad { config, warnings } =
        loader.load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    log_warnings(&warnings);

    info!(
        blackout.start = %config.blackout.start,
        blackout.end = %config.blackout.end,
        blackout.default = config.metadata.default_blackout,
        database.max_connections = config.database.max_connections,
        "configuration in effect"
    );

    WorkerContext::connect(&config).await
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}
