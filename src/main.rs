use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mod config;
mod db;
mod error;
mod import;
mod insights;
mod intake;
mod models;
mod report;
mod scoring;
mod seed;
mod store;
mod tools;
mod trend;

use config::Settings;
use intake::{IntakeDraft, IntakeUpdate};
use models::{DiagnosticIntake, DiagnosticResult, Dimension};
use store::DiagnosticStore;

#[derive(Parser)]
#[command(name = "ambisight")]
#[command(about = "Strategic diagnostic intake, scoring and trend tracking", long_about = None)]
struct Cli {
    /// Snapshot file holding intakes and results
    #[arg(long, global = true, env = "AMBISIGHT_STORE", default_value = config::DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Postgres instance used by init-db, push and pull
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new intake from a JSON draft
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace sections of an open intake from a JSON patch
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        file: PathBuf,
    },
    /// Mark an intake complete and score it
    Complete {
        #[arg(long)]
        id: Uuid,
    },
    /// Score a completed intake again, keeping earlier results
    Rescore {
        #[arg(long)]
        id: Uuid,
    },
    /// Delete an intake and all of its results
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// List intakes with their latest overall health
    List,
    /// Show the latest result for an intake
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// Print the chart series for one intake or for everything
    Trend {
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        id: Uuid,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Import intakes from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
        /// Complete and score each imported intake
        #[arg(long)]
        complete: bool,
    },
    /// Load generated demo intakes
    Seed {
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value_t = 2026)]
        seed: u64,
        #[arg(long)]
        complete: bool,
    },
    /// Create or upgrade the Postgres schema
    InitDb,
    /// Mirror the local snapshot to Postgres
    Push,
    /// Replace the local snapshot with the Postgres copy
    Pull,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::InitDb | Commands::Push | Commands::Pull => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new(cli.store, cli.database_url);
    let json = cli.json;

    match cli.command {
        Commands::Create { file } => {
            let draft: IntakeDraft = read_json(&file)?;
            let mut store = open_store(&settings)?;
            let id = store.create_intake(draft)?.id;
            save_store(&store, &settings)?;
            println!("Created intake {id}.");
        }
        Commands::Update { id, file } => {
            let update: IntakeUpdate = read_json(&file)?;
            if update.is_empty() {
                anyhow::bail!("{} contains no intake sections to update", file.display());
            }
            let mut store = open_store(&settings)?;
            store.update_intake(id, &update)?;
            save_store(&store, &settings)?;
            println!("Updated intake {id}.");
        }
        Commands::Complete { id } => {
            let mut store = open_store(&settings)?;
            let result = store.complete_intake(id)?.clone();
            save_store(&store, &settings)?;
            print_result(&result, json)?;
        }
        Commands::Rescore { id } => {
            let mut store = open_store(&settings)?;
            let result = store.rescore(id)?.clone();
            save_store(&store, &settings)?;
            print_result(&result, json)?;
        }
        Commands::Delete { id } => {
            let mut store = open_store(&settings)?;
            let removed = store.delete_intake(id)?;
            save_store(&store, &settings)?;
            println!("Deleted intake {id} and {removed} results.");
        }
        Commands::List => {
            let store = open_store(&settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(store.intakes())?);
                return Ok(());
            }
            if store.intakes().is_empty() {
                println!("No intakes yet.");
                return Ok(());
            }
            for intake in store.intakes() {
                println!(
                    "- {} {} ({}, {}) {}",
                    intake.id,
                    intake.organization_name(),
                    intake.profile.industry,
                    intake.profile.region,
                    intake_state(&store, intake)
                );
            }
        }
        Commands::Show { id } => {
            let store = open_store(&settings)?;
            let result = store.latest_result(id)?;
            print_result(result, json)?;
        }
        Commands::Trend { id } => {
            let store = open_store(&settings)?;
            match store.trend(id) {
                Some(view) => println!("{}", serde_json::to_string_pretty(view.points())?),
                None => println!("No results to chart yet."),
            }
        }
        Commands::Report { id, out } => {
            let store = open_store(&settings)?;
            let intake = store.intake(id)?;
            let result = store.latest_result(id)?;
            let history = store.trend(Some(id));
            let report = report::build_report(intake, result, history.as_ref());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Import { csv, complete } => {
            let drafts = import::read_drafts_from_path(&csv)?;
            let mut store = open_store(&settings)?;
            let imported = add_drafts(&mut store, drafts, complete)?;
            save_store(&store, &settings)?;
            println!("Imported {imported} intakes from {}.", csv.display());
        }
        Commands::Seed {
            count,
            seed,
            complete,
        } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let drafts = seed::demo_drafts(&mut rng, count);
            let mut store = open_store(&settings)?;
            let added = add_drafts(&mut store, drafts, complete)?;
            save_store(&store, &settings)?;
            println!("Seeded {added} demo intakes.");
        }
        Commands::InitDb => {
            let pool = connect(&settings).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Push => {
            let store = open_store(&settings)?;
            let pool = connect(&settings).await?;
            let written = db::push(&pool, &store).await?;
            println!("Pushed {written} records.");
        }
        Commands::Pull => {
            let pool = connect(&settings).await?;
            let store = db::pull(&pool).await?;
            save_store(&store, &settings)?;
            println!(
                "Pulled {} intakes and {} results into {}.",
                store.intakes().len(),
                store.results().len(),
                settings.store_path.display()
            );
        }
    }

    Ok(())
}

async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(settings.database_url()?)
        .await
        .context("failed to connect to Postgres")
}

fn open_store(settings: &Settings) -> anyhow::Result<DiagnosticStore> {
    DiagnosticStore::load(&settings.store_path)
        .with_context(|| format!("failed to load {}", settings.store_path.display()))
}

fn save_store(store: &DiagnosticStore, settings: &Settings) -> anyhow::Result<()> {
    store
        .save(&settings.store_path)
        .with_context(|| format!("failed to write {}", settings.store_path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn add_drafts(
    store: &mut DiagnosticStore,
    drafts: Vec<IntakeDraft>,
    complete: bool,
) -> anyhow::Result<usize> {
    let mut added = 0usize;
    for draft in drafts {
        let name = draft.profile.organization_name.clone();
        let id = store
            .create_intake(draft)
            .with_context(|| format!("rejected intake for {name}"))?
            .id;
        if complete {
            store.complete_intake(id)?;
        }
        added += 1;
    }
    Ok(added)
}

fn intake_state(store: &DiagnosticStore, intake: &DiagnosticIntake) -> String {
    if !intake.completed {
        return "open".to_string();
    }
    match store.latest_result(intake.id) {
        Ok(result) => format!(
            "overall {:.1} ({})",
            result.scores.overall_health,
            result.status.overall.as_str()
        ),
        Err(_) => "completed, no stored result".to_string(),
    }
}

fn print_result(result: &DiagnosticResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!(
        "Result {} for intake {}: overall {:.1} ({})",
        result.id,
        result.intake_id,
        result.scores.overall_health,
        result.status.overall.as_str()
    );
    for dimension in Dimension::ALL {
        println!(
            "  {:<20} {:>5.1} ({})",
            dimension.label(),
            result.scores.get(dimension),
            result.status.get(dimension).as_str()
        );
    }
    println!("Insights:");
    for insight in result.insights.iter() {
        println!(
            "- [{}] {} ({})",
            insight.priority.as_str(),
            insight.title,
            insight.related_area
        );
    }
    println!("Top tools:");
    for rec in result.recommendations.iter().take(5) {
        println!(
            "- {} (relevance {}): {}",
            rec.tool_name, rec.relevance_score, rec.reason
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::tests::sample_draft;
    use crate::store::tests::StepClock;

    #[test]
    fn list_state_follows_completion() {
        let mut store = DiagnosticStore::with_clock(StepClock::new());
        let id = store.create_intake(sample_draft()).unwrap().id;
        assert_eq!(intake_state(&store, store.intake(id).unwrap()), "open");

        store.complete_intake(id).unwrap();
        assert!(intake_state(&store, store.intake(id).unwrap()).starts_with("overall "));

        // A completed intake whose results were dropped on load is still completed.
        let intakes = vec![serde_json::to_value(store.intake(id).unwrap()).unwrap()];
        let reloaded = DiagnosticStore::from_records(intakes, Vec::new());
        assert_eq!(
            intake_state(&reloaded, reloaded.intake(id).unwrap()),
            "completed, no stored result"
        );
    }
}
