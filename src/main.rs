use clap::{Parser, Subcommand};
use hall_of_fame::{
    config::Settings,
    scoring::{Leaderboard, TierClassifier},
    sheet::{RecordSource, WorkbookLoader},
    web::{Router, WebServer},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "hall-of-fame")]
#[clap(about = "Collector leaderboard with point and minifig tiers", long_about = None)]
struct Cli {
    /// Settings file to load instead of config/default and config/local
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind
        #[clap(long)]
        host: Option<String>,

        /// Port to listen on (falls back to $PORT, then settings)
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Print the leaderboard
    Rank {
        /// Workbook to read instead of the configured one
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Emit JSON instead of a table
        #[clap(long)]
        json: bool,

        /// Only show the first N collectors
        #[clap(short, long)]
        limit: Option<usize>,
    },

    /// Classify a single points/minifigs pair
    Classify {
        #[clap(long, allow_hyphen_values = true)]
        points: i64,

        #[clap(long, allow_hyphen_values = true)]
        minifigs: i64,
    },

    /// Validate settings and exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
    let classifier = Arc::new(TierClassifier::new(&settings.tiers)?);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = settings
                .server
                .resolve_port(port, std::env::var("PORT").ok().as_deref());
            let addr = format!("{}:{}", host, port);

            let loader = WorkbookLoader::from_settings(&settings.data);
            info!("Reading collectors from {}", loader.describe());

            let router = Router::new(Arc::new(settings), classifier, Arc::new(loader));
            let server = WebServer::bind(&addr, router)?;
            let handle = server.shutdown_handle();

            let mut worker = tokio::task::spawn_blocking(move || server.run());
            tokio::select! {
                result = &mut worker => result?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    handle.shutdown();
                    worker.await?;
                }
            }
        }

        Commands::Rank { file, json, limit } => {
            let loader = match file {
                Some(path) => WorkbookLoader::new(path, settings.data.columns.clone()),
                None => WorkbookLoader::from_settings(&settings.data),
            };
            let board = Leaderboard::build(loader.load_records()?, &classifier);
            let shown = board.top(limit.unwrap_or(board.len()));

            if json {
                println!("{}", serde_json::to_string_pretty(shown)?);
            } else if shown.is_empty() {
                println!("No collectors found in {}", loader.describe());
            } else {
                println!(
                    "{:>3}  {:<24} {:>7} {:>8}  {:<13} {:<13} {:<13} {}",
                    "#", "Collector", "Points", "Minifigs", "Points Tier", "Minifig Tier", "Overall", "Source"
                );
                for (i, c) in shown.iter().enumerate() {
                    println!(
                        "{:>3}  {:<24} {:>7} {:>8}  {:<13} {:<13} {:<13} {}",
                        i + 1,
                        c.record.collector_name,
                        c.record.total_points,
                        c.record.total_minifigs,
                        c.tiers.points_tier,
                        c.tiers.minifig_tier,
                        c.tiers.overall_tier,
                        c.tiers.tier_source,
                    );
                }
            }
        }

        Commands::Classify { points, minifigs } => {
            let result = classifier.classify(points, minifigs);
            println!("Points tier:  {}", result.points_tier);
            println!("Minifig tier: {}", result.minifig_tier);
            println!("Overall:      {} (from {})", result.overall_tier, result.tier_source);
        }

        Commands::Check => {
            println!("Settings OK");
            println!("Workbook: {}", settings.data.workbook_path.display());
            println!("Tiers: {}", settings.tiers.order.join(" < "));
        }
    }

    Ok(())
}
