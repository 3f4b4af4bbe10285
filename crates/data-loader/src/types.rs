//! Core domain types for the MovieLens loader.
//!
//! Three families of types live here:
//! - Row types, one per source CSV file, mirroring the file's columns
//! - Fact types, the leaf records embedded in a movie document
//! - The dimension row and the output `MovieDocument`
//!
//! Serde attributes on the output types define the field names the document
//! store sees (`movieId`, `genomeTags`, ...), so they must not change.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Type Aliases
// =============================================================================

/// Movie identifier shared by all six source tables (the join key)
pub type MovieId = u32;

/// Identifier of the user who rated or tagged a movie
pub type UserId = u32;

/// Identifier of a genome tag (`genome-tags.csv`)
pub type TagId = u32;

// =============================================================================
// Source Rows
// =============================================================================

/// One row of `ratings.csv`: userId,movieId,rating,timestamp
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRow {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
    pub timestamp: i64,
}

/// One row of `tags.csv`: userId,movieId,tag,timestamp
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRow {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub tag: String,
    pub timestamp: i64,
}

/// One row of `links.csv`: movieId,imdbId,tmdbId
///
/// The external ids stay text: IMDb ids carry leading zeros and some
/// movies have no TMDb id at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRow {
    pub movie_id: MovieId,
    pub imdb_id: String,
    pub tmdb_id: String,
}

/// One row of `movies.csv`: movieId,title,genres
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRow {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: String,
}

/// One row of `genome-scores.csv`: movieId,tagId,relevance
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomeScoreRow {
    pub movie_id: MovieId,
    pub tag_id: TagId,
    pub relevance: f64,
}

/// One row of `genome-tags.csv`: tagId,tag
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomeTagRow {
    pub tag_id: TagId,
    pub tag: String,
}

// =============================================================================
// Facts
// =============================================================================

/// A single rating embedded in a movie document
///
/// Rust concept: small `Copy` struct, so grouping moves it around cheaply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingFact {
    pub user_id: UserId,
    pub rating: f64,
    /// Unix timestamp (seconds) when the rating was made
    pub timestamp: i64,
}

/// A free-text tag a user applied to a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFact {
    pub user_id: UserId,
    pub tag: String,
    pub timestamp: i64,
}

/// A genome score before its label is resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenomeScore {
    pub tag_id: TagId,
    pub relevance: f64,
}

/// A genome relevance score with its resolved tag label
///
/// The label is an `Arc<str>` shared by every fact carrying the same tag:
/// there are ~1,100 labels but millions of scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomeTagFact {
    pub tag_id: TagId,
    pub tag: Arc<str>,
    /// Relevance in `[0, 1]`
    pub relevance: f64,
}

// =============================================================================
// Dimension & Document
// =============================================================================

/// The joined movies + links row for one movie
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDimension {
    pub movie_id: MovieId,
    /// Title as it appears in movies.csv, usually ending in "(YYYY)"
    pub raw_title: String,
    /// Pipe-split genres, never empty
    pub genres: Vec<String>,
    pub imdb_id: String,
    pub tmdb_id: String,
}

/// One output document per movie
///
/// Fact lists are always present: a movie with no ratings gets `ratings: []`,
/// never a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDocument {
    pub movie_id: MovieId,
    /// Title with the release year stripped
    pub title: String,
    pub genres: Vec<String>,
    /// Release year, 0 when the title carries none
    pub year: i32,
    pub imdb_id: String,
    pub tmdb_id: String,
    pub ratings: Vec<RatingFact>,
    pub tags: Vec<TagFact>,
    pub genome_tags: Vec<GenomeTagFact>,
}

impl MovieDocument {
    /// Total number of embedded facts, used for progress logging
    pub fn fact_count(&self) -> usize {
        self.ratings.len() + self.tags.len() + self.genome_tags.len()
    }
}
