//! Joins against the dimension tables.
//!
//! Two joins happen here, each waiting for both of its inputs:
//! - movies.csv ⋈ links.csv on movieId -> [`MovieDimensions`]
//! - genome scores ⋈ genome-tags.csv on tagId -> resolved [`GenomeTagFact`]s
//!
//! Both are hash joins keyed on the integer id. A duplicate key on the
//! one-row-per-key side makes the join ambiguous and fails the load.

use crate::aggregate::FactGroups;
use crate::error::{DataLoadError, Result};
use crate::parser::CsvRecord;
use crate::types::*;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

// =============================================================================
// Movies + Links
// =============================================================================

/// The inner join of movies and links, in movies.csv order
#[derive(Debug, Default)]
pub struct MovieDimensions {
    rows: Vec<MovieDimension>,
    /// movieIds only found in movies.csv
    pub movies_without_links: usize,
    /// movieIds only found in links.csv
    pub links_without_movies: usize,
}

impl MovieDimensions {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MovieDimension] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<MovieDimension> {
        self.rows
    }
}

/// Split the pipe-delimited genres field.
///
/// An empty field yields one empty genre, as the source data does.
pub fn split_genres(raw: &str) -> Vec<String> {
    raw.split('|').map(str::to_string).collect()
}

/// Inner-join movies and links on movieId.
///
/// Movies without a link row (and links without a movie) are dropped; the
/// counts are kept on the result and logged.
pub fn merge_dimensions(movies: Vec<MovieRow>, links: Vec<LinkRow>) -> Result<MovieDimensions> {
    let mut links_by_movie: HashMap<MovieId, LinkRow> = HashMap::with_capacity(links.len());
    for link in links {
        match links_by_movie.entry(link.movie_id) {
            Entry::Occupied(_) => {
                return Err(DataLoadError::duplicate_movie(LinkRow::FILE_NAME, link.movie_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(link);
            }
        }
    }

    let mut seen: HashSet<MovieId> = HashSet::with_capacity(movies.len());
    let mut rows = Vec::with_capacity(movies.len().min(links_by_movie.len()));
    let mut movies_without_links = 0;

    for movie in movies {
        if !seen.insert(movie.movie_id) {
            return Err(DataLoadError::duplicate_movie(MovieRow::FILE_NAME, movie.movie_id));
        }

        let Some(link) = links_by_movie.remove(&movie.movie_id) else {
            movies_without_links += 1;
            continue;
        };

        rows.push(MovieDimension {
            movie_id: movie.movie_id,
            genres: split_genres(&movie.genres),
            raw_title: movie.title,
            imdb_id: link.imdb_id,
            tmdb_id: link.tmdb_id,
        });
    }

    // Whatever is left in the link map never matched a movie
    let links_without_movies = links_by_movie.len();

    info!("Joined movies and links: {} movies", rows.len());
    if movies_without_links > 0 || links_without_movies > 0 {
        info!(
            "Dropped {} movies without links and {} links without movies",
            movies_without_links, links_without_movies
        );
    }

    Ok(MovieDimensions {
        rows,
        movies_without_links,
        links_without_movies,
    })
}

// =============================================================================
// Genome labels
// =============================================================================

/// tagId -> label lookup built from genome-tags.csv
#[derive(Debug, Default)]
pub struct GenomeLabels {
    labels: HashMap<TagId, Arc<str>>,
}

impl GenomeLabels {
    /// Build the lookup, rejecting duplicate tagIds
    pub fn from_rows(rows: Vec<GenomeTagRow>) -> Result<Self> {
        let mut labels: HashMap<TagId, Arc<str>> = HashMap::with_capacity(rows.len());
        for row in rows {
            match labels.entry(row.tag_id) {
                Entry::Occupied(_) => {
                    return Err(DataLoadError::DuplicateKey {
                        file: GenomeTagRow::FILE_NAME.to_string(),
                        key: "tagId",
                        id: row.tag_id,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(Arc::from(row.tag));
                }
            }
        }
        Ok(Self { labels })
    }

    pub fn get(&self, tag_id: TagId) -> Option<&Arc<str>> {
        self.labels.get(&tag_id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Attach labels to grouped genome scores.
///
/// Scores whose tagId has no label are dropped; each unknown tagId is
/// reported once with the number of rows it cost.
pub fn resolve_genome_labels(
    scores: FactGroups<GenomeScore>,
    labels: &GenomeLabels,
) -> FactGroups<GenomeTagFact> {
    let mut resolved = FactGroups::new();
    let mut unknown: BTreeMap<TagId, usize> = BTreeMap::new();

    for (movie_id, movie_scores) in scores.into_inner() {
        for score in movie_scores {
            match labels.get(score.tag_id) {
                Some(tag) => resolved.push(
                    movie_id,
                    GenomeTagFact {
                        tag_id: score.tag_id,
                        tag: Arc::clone(tag),
                        relevance: score.relevance,
                    },
                ),
                None => *unknown.entry(score.tag_id).or_insert(0) += 1,
            }
        }
    }

    for (tag_id, dropped) in &unknown {
        warn!(
            "No label for genome tagId {} in {}, dropped {} scores",
            tag_id,
            GenomeTagRow::FILE_NAME,
            dropped
        );
    }
    info!(
        "Resolved {} genome scores for {} movies",
        resolved.fact_count(),
        resolved.movie_count()
    );

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, title: &str, genres: &str) -> MovieRow {
        MovieRow {
            movie_id: id,
            title: title.to_string(),
            genres: genres.to_string(),
        }
    }

    fn genome_tag(tag_id: TagId, tag: &str) -> GenomeTagRow {
        GenomeTagRow {
            tag_id,
            tag: tag.to_string(),
        }
    }

    fn score(tag_id: TagId, relevance: f64) -> GenomeScore {
        GenomeScore { tag_id, relevance }
    }

    fn link(id: MovieId, imdb: &str, tmdb: &str) -> LinkRow {
        LinkRow {
            movie_id: id,
            imdb_id: imdb.to_string(),
            tmdb_id: tmdb.to_string(),
        }
    }

    #[test]
    fn test_split_genres() {
        assert_eq!(split_genres("Comedy|Romance"), vec!["Comedy", "Romance"]);
        assert_eq!(split_genres(""), vec![""]);
        assert_eq!(
            split_genres("(no genres listed)"),
            vec!["(no genres listed)"]
        );
    }

    #[test]
    fn test_inner_join_keeps_movies_order() {
        let movies = vec![
            movie(3, "Grumpier Old Men (1995)", "Comedy|Romance"),
            movie(1, "Toy Story (1995)", "Adventure|Animation"),
            movie(9, "Sudden Death (1995)", "Action"),
        ];
        let links = vec![
            link(1, "0114709", "862"),
            link(3, "0113228", "15602"),
            link(4, "0114885", ""),
        ];

        let dims = merge_dimensions(movies, links).unwrap();
        let ids: Vec<MovieId> = dims.rows().iter().map(|d| d.movie_id).collect();

        assert_eq!(ids, vec![3, 1]);
        assert_eq!(dims.movies_without_links, 1);
        assert_eq!(dims.links_without_movies, 1);
        assert_eq!(dims.rows()[0].genres, vec!["Comedy", "Romance"]);
        assert_eq!(dims.rows()[1].imdb_id, "0114709");
    }

    #[test]
    fn test_duplicate_movie_is_merge_error() {
        let movies = vec![movie(1, "A", "Drama"), movie(1, "B", "Drama")];
        let err = merge_dimensions(movies, vec![link(1, "1", "1")]).unwrap_err();
        assert!(err.is_merge_error());
        assert!(err.to_string().contains("movies.csv"));
    }

    #[test]
    fn test_duplicate_link_is_merge_error() {
        let links = vec![link(1, "1", "1"), link(1, "2", "2")];
        let err = merge_dimensions(vec![movie(1, "A", "Drama")], links).unwrap_err();
        assert!(err.to_string().contains("links.csv"));
    }

    #[test]
    fn test_resolve_labels_drops_unknown_tags() {
        let labels =
            GenomeLabels::from_rows(vec![genome_tag(1, "007"), genome_tag(2, "007 (series)")])
                .unwrap();
        assert_eq!(labels.len(), 2);

        let scores: FactGroups<GenomeScore> = vec![
            (1, score(2, 0.5)),
            (1, score(99, 0.1)),
            (1, score(1, 0.25)),
            (2, score(99, 0.9)),
        ]
        .into_iter()
        .collect();

        let resolved = resolve_genome_labels(scores, &labels);
        let movie_1: Vec<(TagId, &str)> = resolved
            .get(1)
            .iter()
            .map(|g| (g.tag_id, g.tag.as_ref()))
            .collect();

        assert_eq!(movie_1, vec![(2, "007 (series)"), (1, "007")]);
        assert!(resolved.get(2).is_empty());
        assert_eq!(resolved.fact_count(), 2);
    }

    #[test]
    fn test_duplicate_genome_tag_is_merge_error() {
        let err = GenomeLabels::from_rows(vec![genome_tag(5, "a"), genome_tag(5, "b")])
            .unwrap_err();
        assert!(err.is_merge_error());
    }

    #[test]
    fn test_no_genome_tags_resolves_nothing() {
        let labels = GenomeLabels::from_rows(Vec::new()).unwrap();
        assert!(labels.is_empty());

        let scores: FactGroups<GenomeScore> = vec![(1, score(1, 0.5))].into_iter().collect();
        let resolved = resolve_genome_labels(scores, &labels);
        assert!(resolved.is_empty());
    }
}
