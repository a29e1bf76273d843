use clap::{Parser, Subcommand};
use gradbridge::{
    analytics::PostgresAnalyticsView,
    api::{ApiServer, ApiState},
    config::{Config, ConfigLoader},
    enrich,
    error::Result,
    health::{HealthRegistry, PostgresHealthCheck, RedisHealthCheck},
    pipeline::{IngestPipeline, Worker},
    queue::{RedisBroker, TaskBroker},
    source::{HttpPageFetcher, RecordFetcher},
    storage::{
        ApplicantStore, PostgresApplicantStore, PostgresConnector, PostgresWatermarkStore,
        WatermarkStore,
    },
};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "gradbridge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Incremental admissions-survey ingestion service",
    long_about = None
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "GRADBRIDGE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GRADBRIDGE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the task queue worker (default)
    Worker,
    /// Run the producer-facing API server
    Serve,
    /// Run one ingest pass synchronously, without the broker
    Ingest,
    /// Validate configuration
    Validate,
    /// Generate sample configuration
    GenerateSample,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level);

    info!("gradbridge v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::GenerateSample) => {
            println!("{}", ConfigLoader::generate_sample());
            return Ok(());
        }
        Some(Commands::Validate) => {
            info!("Validating configuration...");
            let config = load_config(cli.config.as_deref())?;
            ConfigLoader::validate(&config)?;
            info!("Configuration is valid");
            return Ok(());
        }
        Some(Commands::Serve) => {
            let config = load_config(cli.config.as_deref())?;
            return run_serve(config).await;
        }
        Some(Commands::Ingest) => {
            let config = load_config(cli.config.as_deref())?;
            return run_ingest_once(config).await;
        }
        Some(Commands::Worker) | None => {
            let config = load_config(cli.config.as_deref())?;
            return run_worker(config).await;
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = format!("gradbridge={},info", log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            ConfigLoader::load_from_file(path)
        }
        None => {
            info!("Loading configuration from default locations");
            ConfigLoader::load()
        }
    }
}

/// Shared database wiring: connect, ensure schema, build the stores.
async fn build_stores(
    config: &Config,
) -> Result<(
    PostgresConnector,
    Arc<dyn ApplicantStore>,
    Arc<dyn WatermarkStore>,
)> {
    let connector = PostgresConnector::new(&config.database)?;
    connector.connect().await?;
    connector.ensure_schema().await?;

    let applicants: Arc<dyn ApplicantStore> =
        Arc::new(PostgresApplicantStore::new(connector.clone()));
    let watermarks: Arc<dyn WatermarkStore> =
        Arc::new(PostgresWatermarkStore::new(connector.clone()));

    Ok((connector, applicants, watermarks))
}

fn build_pipeline(
    config: &Config,
    applicants: Arc<dyn ApplicantStore>,
    watermarks: Arc<dyn WatermarkStore>,
) -> Result<IngestPipeline> {
    let client = Arc::new(HttpPageFetcher::new(&config.source)?);
    let fetcher = RecordFetcher::new(client, &config.source)?;
    let enricher = enrich::from_config(&config.enrichment)?;

    Ok(IngestPipeline::new(
        fetcher,
        enricher,
        applicants,
        watermarks,
        config.source.source_name.clone(),
    ))
}

async fn run_worker(config: Config) -> Result<()> {
    info!("Starting worker");

    let (connector, applicants, watermarks) = build_stores(&config).await?;
    let pipeline = build_pipeline(&config, applicants, watermarks)?;
    let analytics = Arc::new(PostgresAnalyticsView::new(
        connector.clone(),
        &config.analytics,
    ));

    let broker = Arc::new(RedisBroker::new(&config.redis, &config.queue)?);
    broker.wait_until_ready().await;

    let worker = Worker::new(broker, pipeline, analytics);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    info!("Press Ctrl+C to stop");
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }

    let _ = shutdown_tx.send(true);
    match worker_handle.await {
        Ok(result) => result?,
        Err(e) => error!("Worker task panicked: {}", e),
    }

    info!("Worker stopped");
    Ok(())
}

async fn run_serve(config: Config) -> Result<()> {
    info!("Starting API server");

    // The API must come up even when the database is unreachable; health
    // reporting covers the gap. The pool connects lazily.
    let connector = PostgresConnector::new(&config.database)?;
    let analytics = Arc::new(PostgresAnalyticsView::new(
        connector.clone(),
        &config.analytics,
    ));

    let broker: Arc<dyn TaskBroker> = Arc::new(RedisBroker::new(&config.redis, &config.queue)?);

    let health = Arc::new(HealthRegistry::new());
    health
        .register(Box::new(PostgresHealthCheck::new(connector.clone())))
        .await;
    health
        .register(Box::new(RedisHealthCheck::new(config.redis.url.clone())))
        .await;

    let state = ApiState::new(broker, analytics, health);
    ApiServer::new(config.api.clone(), state).start().await
}

async fn run_ingest_once(config: Config) -> Result<()> {
    info!("Running one ingest pass");

    let (_connector, applicants, watermarks) = build_stores(&config).await?;
    let pipeline = build_pipeline(&config, applicants, watermarks)?;

    let report = pipeline.run().await?;
    info!(
        "Ingest pass complete: {} fetched, {} written, watermark {:?}",
        report.fetched, report.written, report.watermark
    );
    Ok(())
}
