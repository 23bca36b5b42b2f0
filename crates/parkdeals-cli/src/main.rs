use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parkdeals_aggregator::{default_sources, run_all, CandidateSource, HttpClient, PgDealStore};
use parkdeals_core::AppConfig;
use parkdeals_db::PoolConfig;

#[derive(Debug, Parser)]
#[command(name = "parkdeals-cli")]
#[command(about = "Theme-park deal aggregation command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run deal aggregation for all registered sources (or one)
    Aggregate {
        /// Restrict the run to a single source (by registered name)
        #[arg(long)]
        source: Option<String>,
    },
    /// List registered sources with their health status
    Sources,
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = parkdeals_core::load_app_config_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Aggregate { source } => run_aggregate(&config, source.as_deref()).await,
        Commands::Sources => run_sources(&config).await,
        Commands::Migrate => run_migrate(&config).await,
    }
}

/// Drives one aggregation pass. Each source runs independently; a failing
/// source is reported and does not block the others. The command only errors
/// when every source fails.
async fn run_aggregate(config: &AppConfig, source_filter: Option<&str>) -> anyhow::Result<()> {
    let pool =
        parkdeals_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
            .await?;
    let store = PgDealStore::new(pool);
    let client = HttpClient::new(config.request_timeout_secs)?;

    let mut sources = default_sources();
    if let Some(name) = source_filter {
        sources.retain(|s| s.name() == name);
        if sources.is_empty() {
            let all_sources = default_sources();
            let known: Vec<&str> = all_sources.iter().map(|s| s.name()).collect();
            anyhow::bail!("unknown source '{name}'; known sources: [{}]", known.join(", "));
        }
    }

    let reports = run_all(&store, &client, &sources).await;

    for report in &reports {
        if report.success {
            println!(
                "{}: ok — {} candidates, {} persisted",
                report.source, report.deals_found, report.persisted
            );
        } else {
            println!(
                "{}: FAILED — {}",
                report.source,
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if reports.iter().all(|r| !r.success) {
        anyhow::bail!("all {} sources failed aggregation", reports.len());
    }

    Ok(())
}

async fn run_sources(config: &AppConfig) -> anyhow::Result<()> {
    let pool =
        parkdeals_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
            .await?;

    let sources = parkdeals_db::list_sources(&pool).await?;
    if sources.is_empty() {
        println!("no sources registered; run `parkdeals-cli migrate` first");
        return Ok(());
    }

    for source in sources {
        let last_checked = source
            .last_checked_at
            .map_or_else(|| "never".to_string(), |ts| ts.to_rfc3339());
        println!(
            "{} [{}] errors={} last_checked={}{}",
            source.name,
            source.source_type,
            source.error_count,
            last_checked,
            source
                .last_error
                .as_deref()
                .map(|e| format!(" last_error={e}"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool =
        parkdeals_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
            .await?;

    let applied = parkdeals_db::run_migrations(&pool).await?;
    println!("applied {applied} migrations");

    Ok(())
}
