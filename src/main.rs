use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use smart_health::cli::{Cli, Commands, HistoryArgs, ReportArgs};
use smart_health::config::Config;
use smart_health::db;
use smart_health::history::{
    run_downsample, DownsampleService, HistoryService, PgTierStore, SnapshotWriter, TierStore,
};
use smart_health::smart::raw::RawSmartReport;
use smart_health::smart::snapshot::{evaluate_snapshot, Snapshot};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn init_tracing(config: &Config) -> Result<()> {
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{runtime::Tokio, trace::Config as OTelTraceConfig, Resource};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,smart_health=info".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true);

    let Some(endpoint) = config
        .otlp_endpoint
        .as_deref()
        .map(normalize_otlp_http_endpoint)
        .filter(|endpoint| !endpoint.is_empty())
    else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
        return Ok(());
    };

    let exporter = opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(endpoint);
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(OTelTraceConfig::default().with_resource(Resource::new(vec![
            KeyValue::new("service.name", "smart-health"),
        ])))
        .install_batch(Tokio)?;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;
    Ok(())
}

fn normalize_otlp_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() || trimmed.ends_with("/v1/traces") {
        return trimmed.to_string();
    }
    format!("{}/v1/traces", trimmed.trim_end_matches('/'))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn evaluate_report(args: &ReportArgs, config: &Config) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(&args.report)
        .with_context(|| format!("failed to read {}", args.report.display()))?;
    let raw = RawSmartReport::from_json(&contents)
        .with_context(|| format!("rejected report {}", args.report.display()))?;
    let snapshot = evaluate_snapshot(&args.wwn, &raw, &config.attribute_overrides, Utc::now())
        .with_context(|| format!("failed to evaluate {}", args.report.display()))?;
    tracing::info!(
        wwn = %args.wwn,
        protocol = %snapshot.record.device_protocol,
        device_status = %snapshot.device_status,
        attributes = snapshot.record.attributes.len(),
        "evaluated report"
    );
    Ok(snapshot)
}

async fn open_store(config: &Config) -> Result<Arc<dyn TierStore>> {
    let pool = db::connect(config.database_url()?, config.db_pool_size).await?;
    db::ensure_schema(&pool).await?;
    Ok(Arc::new(PgTierStore::new(pool)))
}

async fn history(args: &HistoryArgs, store: Arc<dyn TierStore>) -> Result<()> {
    let records = HistoryService::new(store)
        .attribute_history(
            &args.wwn,
            args.duration,
            args.limit,
            args.offset,
            &args.attributes,
            Utc::now(),
        )
        .await
        .with_context(|| format!("failed to read history for {}", args.wwn))?;
    print_json(&records)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config)?;

    match cli.command {
        Commands::Evaluate(args) => {
            let snapshot = evaluate_report(&args, &config)?;
            print_json(&snapshot)?;
        }
        Commands::Ingest(args) => {
            let snapshot = evaluate_report(&args, &config)?;
            let store = open_store(&config).await?;
            let written = SnapshotWriter::new(store)
                .write(&snapshot)
                .await
                .context("failed to store snapshot")?;
            tracing::info!(wwn = %args.wwn, written, "ingested snapshot");
        }
        Commands::History(args) => {
            let store = open_store(&config).await?;
            history(&args, store).await?;
        }
        Commands::Temperature(args) => {
            let store = open_store(&config).await?;
            let series = HistoryService::new(store)
                .temperature_history(args.duration, Utc::now())
                .await
                .context("failed to read temperature history")?;
            print_json(&series)?;
        }
        Commands::Downsample(args) => {
            let store = open_store(&config).await?;
            let written = run_downsample(store.as_ref(), args.transition, Utc::now())
                .await
                .with_context(|| format!("{} downsample failed", args.transition))?;
            tracing::info!(transition = %args.transition, written, "downsample complete");
        }
        Commands::Serve => {
            let store = open_store(&config).await?;
            let cancel = CancellationToken::new();
            if config.downsample_enabled {
                DownsampleService::new(
                    store,
                    config.downsample_run_on_start,
                    config.retention_sweep_interval(),
                )
                .start(cancel.clone());
                tracing::info!("downsample schedules started");
            } else {
                tracing::warn!("downsampling disabled; serve is idle");
            }
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for shutdown signal")?;
            tracing::info!("shutting down");
            cancel.cancel();
        }
    }
    Ok(())
}
