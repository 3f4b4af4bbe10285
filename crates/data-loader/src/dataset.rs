//! Loading the six source files into joined, grouped form.
//!
//! This is the CPU-bound half of a load:
//! 1. Check that all six files exist (fail before any work starts)
//! 2. Parse and aggregate the six files in parallel, one rayon task each
//! 3. Barrier: join movies with links, and resolve genome labels
//! 4. Hand everything to the [`DocumentAssembler`]
//!
//! Rust concepts you'll see here:
//! - `rayon::join` for fork/join parallelism (nested for six-way)
//! - The `?` operator to surface the first failing worker
//! - Moving owned data into the next stage instead of cloning

use crate::aggregate::{FactGroups, aggregate_file};
use crate::assemble::DocumentAssembler;
use crate::error::{DataLoadError, Result};
use crate::merge::{GenomeLabels, MovieDimensions, merge_dimensions, resolve_genome_labels};
use crate::parser::{SOURCE_FILES, read_table};
use crate::types::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Everything needed to assemble the output documents
#[derive(Debug)]
pub struct Dataset {
    pub dimensions: MovieDimensions,
    pub ratings: FactGroups<RatingFact>,
    pub tags: FactGroups<TagFact>,
    pub genome_tags: FactGroups<GenomeTagFact>,
}

/// Row counts after loading, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetCounts {
    pub movies: usize,
    pub ratings: usize,
    pub tags: usize,
    pub genome_tags: usize,
}

impl Dataset {
    /// Load the six MovieLens CSV files from `dir`.
    ///
    /// Any parse or merge failure is returned before a single document
    /// exists, so a failed load never touches the store.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        info!("Loading MovieLens CSV files from {}", dir.display());
        let start = Instant::now();

        check_source_files(dir)?;

        // Six independent readers. Each closure owns its file and produces a
        // disjoint structure, so no synchronization is needed until the joins.
        let ((ratings, tags), ((genome_scores, genome_tags), (movies, links))) = rayon::join(
            || {
                rayon::join(
                    || aggregate_file::<RatingRow>(dir),
                    || aggregate_file::<TagRow>(dir),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || aggregate_file::<GenomeScoreRow>(dir),
                            || read_table::<GenomeTagRow>(dir),
                        )
                    },
                    || {
                        rayon::join(
                            || read_table::<MovieRow>(dir),
                            || read_table::<LinkRow>(dir),
                        )
                    },
                )
            },
        );

        let ratings = ratings?;
        let tags = tags?;
        let genome_scores = genome_scores?;
        let genome_tags = genome_tags?;
        let movies = movies?;
        let links = links?;

        info!(
            "Parsed {} movies, {} links, {} genome tags in {:.2?}",
            movies.len(),
            links.len(),
            genome_tags.len(),
            start.elapsed()
        );

        // Both joins need their two inputs complete; they are independent of
        // each other.
        let (dimensions, genome_tags) = rayon::join(
            || merge_dimensions(movies, links),
            || {
                GenomeLabels::from_rows(genome_tags).map(|labels| {
                    debug!("Resolving genome scores against {} labels", labels.len());
                    resolve_genome_labels(genome_scores, &labels)
                })
            },
        );

        let dataset = Self {
            dimensions: dimensions?,
            ratings,
            tags,
            genome_tags: genome_tags?,
        };

        let counts = dataset.counts();
        info!(
            "Dataset ready in {:.2?}: {} movies, {} ratings, {} tags, {} genome scores",
            start.elapsed(),
            counts.movies,
            counts.ratings,
            counts.tags,
            counts.genome_tags
        );
        Ok(dataset)
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            movies: self.dimensions.len(),
            ratings: self.ratings.fact_count(),
            tags: self.tags.fact_count(),
            genome_tags: self.genome_tags.fact_count(),
        }
    }

    /// Turn the dataset into the lazy document stream
    pub fn into_documents(self) -> DocumentAssembler {
        DocumentAssembler::new(self.dimensions, self.ratings, self.tags, self.genome_tags)
    }
}

/// Fail with the first missing file, naming it
pub fn check_source_files(dir: &Path) -> Result<()> {
    for name in SOURCE_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(DataLoadError::MissingFile {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
