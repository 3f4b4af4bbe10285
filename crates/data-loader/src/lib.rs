//! # Data Loader Crate
//!
//! This crate turns the MovieLens CSV exports (ratings, tags, links, movies,
//! genome scores, genome tags) into one denormalized document per movie.
//!
//! ## Main Components
//!
//! - **types**: Row, fact, dimension and document types
//! - **parser**: Stream-parse each CSV file into typed rows
//! - **aggregate**: Group fact rows by movie in file order
//! - **merge**: Join movies with links, and genome scores with their labels
//! - **title**: Extract and strip the release year from a title
//! - **assemble**: Lazily build `MovieDocument`s from the joined data
//! - **dataset**: Run all of the above in parallel for a source folder
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_dir(Path::new("data/ml-25m"))?;
//! for document in dataset.into_documents() {
//!     println!("{} ({}) has {} ratings", document.title, document.year, document.ratings.len());
//! }
//! ```
//!
//! ## Memory Model
//!
//! Parsing streams row by row. What stays resident until assembly is the
//! grouped facts (dominated by ratings) plus the small dimension tables.
//! The assembler moves each movie's facts into its document, so memory
//! drains as documents are written.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod aggregate;
pub mod merge;
pub mod title;
pub mod assemble;
pub mod dataset;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    MovieId,
    TagId,
    UserId,
    // Facts
    GenomeScore,
    GenomeTagFact,
    RatingFact,
    TagFact,
    // Dimension & output
    MovieDimension,
    MovieDocument,
};
pub use aggregate::FactGroups;
pub use assemble::DocumentAssembler;
pub use dataset::{Dataset, DatasetCounts};
pub use merge::{GenomeLabels, MovieDimensions};
pub use title::normalize_title;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_assembles_nothing() {
        let dataset = Dataset {
            dimensions: MovieDimensions::default(),
            ratings: FactGroups::new(),
            tags: FactGroups::new(),
            genome_tags: FactGroups::new(),
        };

        let (movies, ratings) = (dataset.counts().movies, dataset.counts().ratings);
        assert_eq!(movies, 0);
        assert_eq!(ratings, 0);
        assert_eq!(dataset.into_documents().count(), 0);
    }

    #[test]
    fn test_bare_document_has_no_facts() {
        let document = MovieDocument {
            movie_id: 1,
            title: "Toy Story".to_string(),
            genres: vec!["Animation".to_string()],
            year: 1995,
            imdb_id: "0114709".to_string(),
            tmdb_id: "862".to_string(),
            ratings: vec![],
            tags: vec![],
            genome_tags: vec![],
        };

        assert_eq!(document.fact_count(), 0);
    }
}
