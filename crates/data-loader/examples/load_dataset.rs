use data_loader::Dataset;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/ml-25m"));

    println!("Loading MovieLens CSV files from {}...\n", data_dir.display());

    let start = Instant::now();
    let dataset = Dataset::load_from_dir(&data_dir).expect("Failed to load dataset");
    let load_elapsed = start.elapsed();
    let counts = dataset.counts();

    // Drain the assembler without writing anywhere to time document building
    let assemble_start = Instant::now();
    let mut documents = 0usize;
    let mut facts = 0usize;
    for document in dataset.into_documents() {
        documents += 1;
        facts += document.fact_count();
    }
    let assemble_elapsed = assemble_start.elapsed();

    println!("\n=== Load Complete ===");
    println!("Load time: {:?}", load_elapsed);
    println!("Assembly time: {:?}", assemble_elapsed);
    println!("Movies: {}", counts.movies);
    println!("Ratings: {}", counts.ratings);
    println!("Tags: {}", counts.tags);
    println!("Genome scores: {}", counts.genome_tags);
    println!("Documents: {} ({} embedded facts)", documents, facts);
    println!(
        "\nPerformance: {:.0} ratings/second",
        counts.ratings as f64 / load_elapsed.as_secs_f64()
    );
}
