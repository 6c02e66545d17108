mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "disclosures")]
#[command(about = "Import Utah campaign-finance and lobbyist disclosures into SQLite")]
struct Cli {
    /// SQLite database path
    #[arg(long, default_value = "disclosures.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one campaign-finance report by ID or URL
    ImportReport(commands::reports::ImportArgs),
    /// Import one lobbyist expenditure report by ID or URL
    ImportLobbyistReport(commands::lobbyist_reports::ImportArgs),
    /// Import one entity registration by ID or URL
    ImportEntity(commands::entities::ImportArgs),
    /// Import one lobbyist registration by ID or URL
    ImportLobbyistEntity(commands::lobbyist_entities::ImportArgs),
    /// Crawl campaign-finance reports over an ID range
    CrawlReports(commands::reports::CrawlArgs),
    /// Crawl lobbyist reports over an ID range
    CrawlLobbyistReports(commands::lobbyist_reports::CrawlArgs),
    /// Crawl entity registrations over an ID range
    CrawlEntities(commands::entities::CrawlArgs),
    /// Crawl lobbyist registrations over an ID range
    CrawlLobbyistEntities(commands::lobbyist_entities::CrawlArgs),
}


#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("disclosures_lib=info".parse().unwrap())
                .add_directive("disclosures_scrape=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::ImportReport(args) => commands::reports::run_import(args, &cli.db).await?,
        Commands::ImportLobbyistReport(args) => {
            commands::lobbyist_reports::run_import(args, &cli.db).await?
        }
        Commands::ImportEntity(args) => commands::entities::run_import(args, &cli.db).await?,
        Commands::ImportLobbyistEntity(args) => {
            commands::lobbyist_entities::run_import(args, &cli.db).await?
        }
        Commands::CrawlReports(args) => commands::reports::run_crawl(args, &cli.db).await?,
        Commands::CrawlLobbyistReports(args) => {
            commands::lobbyist_reports::run_crawl(args, &cli.db).await?
        }
        Commands::CrawlEntities(args) => commands::entities::run_crawl(args, &cli.db).await?,
        Commands::CrawlLobbyistEntities(args) => {
            commands::lobbyist_entities::run_crawl(args, &cli.db).await?
        }
    }

    Ok(())
}
