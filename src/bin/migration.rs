use clap::{Parser, Subcommand};
use freightwms_api::migrator::Migrator;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::info;

/// Schema migration tool for the freightwms database
#[derive(Debug, Parser)]
#[command(name = "migration", version, about)]
struct Cli {
    /// Database URL; falls back to APP__DATABASE_URL, then DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        /// Number of migrations to apply
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Print the status of every migration
    Status,
    /// Drop everything and re-apply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let database_url = cli
        .database_url
        .or_else(|| std::env::var("APP__DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://freightwms.db?mode=rwc".to_string());

    info!("Connecting to database: {}", database_url);

    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            Migrator::up(&db, steps).await?;
            info!("Migration completed successfully");
        }
        Command::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            info!("Rolled back {} migration(s)", steps);
        }
        Command::Status => {
            Migrator::status(&db).await?;
        }
        Command::Fresh => {
            Migrator::fresh(&db).await?;
            info!("Database recreated from scratch");
        }
    }

    Ok(())
}
