//! ScholarDemon seeder
//!
//! Applies migrations, then loads the demo dataset in one transaction.

mod fixtures;

use anyhow::Context;
use clap::Parser;
use scholardemon_common::{config::AppConfig, db::DbPool};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tables emptied by `--reset`, children before parents
const SEEDED_TABLES: &str = "search_history, comments, user_follows_venues, user_follows_authors, \
    user_library, citations, paper_research_areas, paper_keywords, paper_authors, papers, \
    keywords, venues, author_research_areas, authors, research_areas, institutions, users";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Apply migrations and stop
    #[arg(long)]
    migrate_only: bool,

    /// Empty every seeded table before loading the dataset
    #[arg(long, conflicts_with = "migrate_only")]
    reset: bool,

    /// Configuration file to read instead of the layered defaults
    #[arg(long)]
    config: Option<String>,

    /// Database URL, overriding configuration
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    let db = DbPool::connect(&config.database).await?;
    db.migrate().await?;

    if cli.migrate_only {
        info!("Migrations applied, skipping seed data");
        db.close().await?;
        return Ok(());
    }

    let txn = db.write().begin().await?;

    if cli.reset {
        info!("Emptying seeded tables");
        txn.execute_unprepared(&format!("TRUNCATE {SEEDED_TABLES} RESTART IDENTITY CASCADE"))
            .await?;
    }

    // Dropping the transaction on error rolls everything back.
    let summary = fixtures::seed(&txn).await.context("seeding failed, nothing was written")?;
    txn.commit().await?;

    info!(
        users = summary.users,
        authors = summary.authors,
        papers = summary.papers,
        citations = summary.citations,
        comments = summary.comments,
        "Database seeded"
    );

    db.close().await?;
    Ok(())
}
