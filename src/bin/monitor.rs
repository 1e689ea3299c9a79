use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use middleware_monitor::{
    CheckResult, MonitorEngine,
    alerts::alert_sink,
    config::{MonitorConfig, read_config_file},
    storage::{StorageBackend, open_backend},
};
use tracing::{debug, error, info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(about = "Middleware health & integration monitor")]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,

    /// Repeat the check round every N seconds instead of running once
    #[arg(long)]
    interval: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

/// Library and binary share the `middleware_monitor` target prefix
fn log_filter() -> filter::Targets {
    filter::Targets::new().with_target("middleware_monitor", LevelFilter::DEBUG)
}

fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(log_filter())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();
    let args = Args::parse();
    debug!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;
    let storage = open_backend(&config.storage).await?;
    let engine = MonitorEngine::new(&config.engine, storage.clone(), alert_sink(&config.alert));

    let outcome = match args.interval {
        None => run_round(&engine, &config, args.json).await,
        Some(secs) => run_forever(&engine, &config, secs, args.json).await,
    };

    close_storage(storage).await;
    outcome
}

async fn run_forever(
    engine: &MonitorEngine,
    config: &MonitorConfig,
    secs: u64,
    json: bool,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => run_round(engine, config, json).await?,
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt, stopping");
                return Ok(());
            }
        }
    }
}

async fn close_storage(storage: Arc<dyn StorageBackend>) {
    if let Err(e) = storage.close().await {
        error!("failed to close storage: {e}");
    }
}

async fn run_round(
    engine: &MonitorEngine,
    config: &MonitorConfig,
    json: bool,
) -> anyhow::Result<()> {
    info!("starting check round for {} services", config.services.len());

    let mut results = engine.run_checks(&config.services).await;
    results.sort_by(|a, b| a.name.cmp(&b.name));

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{}", summary_line(result));
        }
    }

    Ok(())
}

fn summary_line(result: &CheckResult) -> String {
    let anomaly = result
        .anomaly
        .as_ref()
        .map(|verdict| verdict.message.as_str())
        .unwrap_or_default();

    format!(
        "{:<24} {:<5} {:<9} {:>8.4}s  {}  [{}]",
        result.name,
        result.service_type,
        result.sla_status,
        result.response_time,
        result.message,
        anomaly
    )
}
