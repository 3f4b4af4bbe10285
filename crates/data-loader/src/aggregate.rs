//! Fact aggregation: group row streams by movie.
//!
//! Ratings, tags and genome scores arrive as one row per fact. The
//! aggregators fold them into `MovieId -> Vec<Fact>` maps that the document
//! assembler later drains. Within a movie, facts keep the order in which
//! they appeared in the file; nothing is sorted.
//!
//! Memory: the ratings and tags groups are the largest structures kept for
//! the whole run (16-24 bytes per rating). The parser's record buffer is
//! reused per row and dropped once the file is consumed.

use crate::error::Result;
use crate::parser::{CsvRecord, RecordReader};
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// A row that contributes one fact to a movie
pub trait GroupedRow: CsvRecord {
    type Fact;

    /// Split the row into its group key and the fact to embed
    fn into_fact(self) -> (MovieId, Self::Fact);
}

impl GroupedRow for RatingRow {
    type Fact = RatingFact;

    fn into_fact(self) -> (MovieId, RatingFact) {
        (
            self.movie_id,
            RatingFact {
                user_id: self.user_id,
                rating: self.rating,
                timestamp: self.timestamp,
            },
        )
    }
}

impl GroupedRow for TagRow {
    type Fact = TagFact;

    fn into_fact(self) -> (MovieId, TagFact) {
        (
            self.movie_id,
            TagFact {
                user_id: self.user_id,
                tag: self.tag,
                timestamp: self.timestamp,
            },
        )
    }
}

impl GroupedRow for GenomeScoreRow {
    type Fact = GenomeScore;

    fn into_fact(self) -> (MovieId, GenomeScore) {
        (
            self.movie_id,
            GenomeScore {
                tag_id: self.tag_id,
                relevance: self.relevance,
            },
        )
    }
}

/// Facts of one kind grouped by movie, in first-seen order.
#[derive(Debug)]
pub struct FactGroups<F> {
    groups: HashMap<MovieId, Vec<F>>,
    facts: usize,
}

impl<F> FactGroups<F> {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            facts: 0,
        }
    }

    /// Append a fact to the end of its movie's sequence
    pub fn push(&mut self, movie_id: MovieId, fact: F) {
        self.groups.entry(movie_id).or_default().push(fact);
        self.facts += 1;
    }

    /// Facts for a movie, empty slice when there are none
    pub fn get(&self, movie_id: MovieId) -> &[F] {
        self.groups
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Move a movie's facts out of the map, empty `Vec` when there are none.
    ///
    /// Rust concept: taking ownership here means the assembler never clones
    /// a fact list, and the memory is released as documents are written.
    pub fn take(&mut self, movie_id: MovieId) -> Vec<F> {
        let facts = self.groups.remove(&movie_id).unwrap_or_default();
        self.facts -= facts.len();
        facts
    }

    /// Number of movies with at least one fact
    pub fn movie_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of facts across all movies
    pub fn fact_count(&self) -> usize {
        self.facts
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn into_inner(self) -> HashMap<MovieId, Vec<F>> {
        self.groups
    }
}

impl<F> Default for FactGroups<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FromIterator<(MovieId, F)> for FactGroups<F> {
    fn from_iter<I: IntoIterator<Item = (MovieId, F)>>(iter: I) -> Self {
        let mut groups = FactGroups::new();
        for (movie_id, fact) in iter {
            groups.push(movie_id, fact);
        }
        groups
    }
}

/// Fold a row stream into groups, stopping at the first bad row
pub fn aggregate<T, I>(rows: I) -> Result<FactGroups<T::Fact>>
where
    T: GroupedRow,
    I: IntoIterator<Item = Result<T>>,
{
    let mut groups = FactGroups::new();
    for row in rows {
        let (movie_id, fact) = row?.into_fact();
        groups.push(movie_id, fact);
    }
    Ok(groups)
}

/// Stream `T::FILE_NAME` from the source folder and group it by movie
pub fn aggregate_file<T: GroupedRow>(dir: &Path) -> Result<FactGroups<T::Fact>> {
    debug!("Aggregating {}", T::FILE_NAME);
    let reader = RecordReader::<T>::open_in(dir)?;
    let groups = aggregate(reader)?;
    info!(
        "Read {} rows from {} ({} movies)",
        groups.fact_count(),
        T::FILE_NAME,
        groups.movie_count()
    );
    Ok(groups)
}
