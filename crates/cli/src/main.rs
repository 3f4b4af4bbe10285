use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ingest::{IngestError, LoadConfig, LoadSummary, populate};
use std::path::PathBuf;
use store::{MongoStore, StoreConfig};
use tracing::error;

/// populate-db - Load MovieLens CSV exports into the Movies document database
#[derive(Parser)]
#[command(name = "populate-db")]
#[command(about = "Populate the Movies database with data from MovieLens", long_about = None)]
struct Cli {
    /// Folder with ratings.csv, tags.csv, links.csv, movies.csv,
    /// genome-scores.csv and genome-tags.csv
    folder: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Cheap check first, so a typo in the folder never opens a connection
    data_loader::dataset::check_source_files(&cli.folder)
        .context("Source folder is incomplete")?;

    let mut store = MongoStore::connect(StoreConfig::default())
        .await
        .context("Failed to connect to MongoDB")?;

    let result = populate(&cli.folder, &mut store, &LoadConfig::default()).await;

    // Released on every path, including a failed load
    store.close().await;

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            report_failure(&e);
            Err(e).context("Load failed")
        }
    }
}

/// Tell the operator what state the collection was left in
fn report_failure(err: &IngestError) {
    match err {
        e if e.is_before_write() => {
            error!("Nothing was written to the collection");
        }
        IngestError::Index { documents, .. } => {
            error!(
                "{} documents are in the collection but indexes are incomplete",
                documents
            );
        }
        _ => {
            error!("The collection holds a partial load; drop it and run again");
        }
    }
}

/// Helper function to format and print the load summary
fn print_summary(summary: &LoadSummary) {
    println!("{}", "MovieLens load complete".bold().blue());
    println!(
        "{} {} movies, {} ratings, {} tags, {} genome scores",
        "✓".green(),
        summary.counts.movies,
        summary.counts.ratings,
        summary.counts.tags,
        summary.counts.genome_tags
    );
    println!(
        "{} {} documents in {} batches ({:.2?})",
        "✓".green(),
        summary.write.documents,
        summary.write.batches,
        summary.write.elapsed
    );
    println!("{} {} indexes built", "✓".green(), summary.indexes);
    println!("Total time: {:.2?}", summary.elapsed);
}
