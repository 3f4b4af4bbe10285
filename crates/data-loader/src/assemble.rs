//! Document assembly: the join fan-out point.
//!
//! [`DocumentAssembler`] walks the joined dimension rows once and builds one
//! [`MovieDocument`] per row, moving that movie's facts out of the grouped
//! maps. It is a plain `Iterator`, so documents are produced on demand and
//! the full output never exists in memory at once.

use crate::aggregate::FactGroups;
use crate::merge::MovieDimensions;
use crate::title::normalize_title;
use crate::types::*;
use std::vec;

/// Lazy, single-pass producer of movie documents.
///
/// Not restartable: facts are moved into the documents as they are built.
pub struct DocumentAssembler {
    dimensions: vec::IntoIter<MovieDimension>,
    ratings: FactGroups<RatingFact>,
    tags: FactGroups<TagFact>,
    genome_tags: FactGroups<GenomeTagFact>,
}

impl DocumentAssembler {
    pub fn new(
        dimensions: MovieDimensions,
        ratings: FactGroups<RatingFact>,
        tags: FactGroups<TagFact>,
        genome_tags: FactGroups<GenomeTagFact>,
    ) -> Self {
        Self {
            dimensions: dimensions.into_rows().into_iter(),
            ratings,
            tags,
            genome_tags,
        }
    }

    /// Documents still to be produced
    pub fn remaining(&self) -> usize {
        self.dimensions.len()
    }

    fn assemble(&mut self, dimension: MovieDimension) -> MovieDocument {
        let (title, year) = normalize_title(&dimension.raw_title);
        let movie_id = dimension.movie_id;

        MovieDocument {
            movie_id,
            title,
            genres: dimension.genres,
            year,
            imdb_id: dimension.imdb_id,
            tmdb_id: dimension.tmdb_id,
            ratings: self.ratings.take(movie_id),
            tags: self.tags.take(movie_id),
            genome_tags: self.genome_tags.take(movie_id),
        }
    }
}

impl Iterator for DocumentAssembler {
    type Item = MovieDocument;

    fn next(&mut self) -> Option<MovieDocument> {
        let dimension = self.dimensions.next()?;
        Some(self.assemble(dimension))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.dimensions.size_hint()
    }
}

impl ExactSizeIterator for DocumentAssembler {}
