use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod scoring;
mod themes;

#[derive(Parser)]
#[command(name = "caresight-staff-quality")]
#[command(about = "Staff quality scoring over aggregated care home data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import employee reviews from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Score staff quality across care homes
    #[command(group(
        ArgGroup::new("scope")
            .args(["location", "name"])
            .multiple(false)
    ))]
    Score {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    #[command(group(
        ArgGroup::new("scope")
            .args(["location", "name"])
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} reviews from {}.", csv.display());
        }
        Commands::Score {
            location,
            name,
            limit,
            json,
        } => {
            let homes = db::fetch_homes(&pool, location.as_deref(), name.as_deref()).await?;
            let today = Utc::now().date_naive();
            let scored = scoring::score_homes(&homes, today);

            if scored.is_empty() {
                println!("No care homes matched.");
                return Ok(());
            }

            if json {
                let page: Vec<_> = scored.iter().take(limit).collect();
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                println!("Care homes by staff-quality score (lowest first):");
                for home in scored.iter().take(limit) {
                    println!(
                        "- {} ({}) score {:.1} [{}] confidence {}, {} review(s)",
                        home.name,
                        home.location_id,
                        home.score.overall_score,
                        home.score.category.label(),
                        home.score.confidence.label(),
                        home.score.data_quality.review_count
                    );
                }
            }
        }
        Commands::Report {
            location,
            name,
            out,
        } => {
            let homes = db::fetch_homes(&pool, location.as_deref(), name.as_deref()).await?;
            let today = Utc::now().date_naive();
            let scored = scoring::score_homes(&homes, today);
            let report = report::build_report(&scored, today);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
