//! Streaming parser for the MovieLens CSV exports.
//!
//! Each source file maps to one row type implementing [`CsvRecord`]. A
//! [`RecordReader`] validates the header once, then yields typed rows one at
//! a time, reusing a single record buffer: nothing but the current row is
//! held in memory.
//!
//! Files:
//! - ratings.csv: userId,movieId,rating,timestamp
//! - tags.csv: userId,movieId,tag,timestamp
//! - links.csv: movieId,imdbId,tmdbId
//! - movies.csv: movieId,title,genres
//! - genome-scores.csv: movieId,tagId,relevance
//! - genome-tags.csv: tagId,tag

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::StringRecord;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, Read};
use std::marker::PhantomData;
use std::path::Path;

/// Schema of one source file.
///
/// Rust concept: associated constants let every row type carry its file
/// name and required columns without an instance.
pub trait CsvRecord: DeserializeOwned {
    /// File name inside the source folder
    const FILE_NAME: &'static str;

    /// Columns that must be present in the header
    const COLUMNS: &'static [&'static str];

    /// Row-level checks beyond type coercion
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

impl CsvRecord for RatingRow {
    const FILE_NAME: &'static str = "ratings.csv";
    const COLUMNS: &'static [&'static str] = &["userId", "movieId", "rating", "timestamp"];
}

impl CsvRecord for TagRow {
    const FILE_NAME: &'static str = "tags.csv";
    const COLUMNS: &'static [&'static str] = &["userId", "movieId", "tag", "timestamp"];
}

impl CsvRecord for LinkRow {
    const FILE_NAME: &'static str = "links.csv";
    const COLUMNS: &'static [&'static str] = &["movieId", "imdbId", "tmdbId"];
}

impl CsvRecord for MovieRow {
    const FILE_NAME: &'static str = "movies.csv";
    const COLUMNS: &'static [&'static str] = &["movieId", "title", "genres"];
}

impl CsvRecord for GenomeScoreRow {
    const FILE_NAME: &'static str = "genome-scores.csv";
    const COLUMNS: &'static [&'static str] = &["movieId", "tagId", "relevance"];

    fn validate(&self) -> std::result::Result<(), String> {
        if (0.0..=1.0).contains(&self.relevance) {
            Ok(())
        } else {
            Err(format!("relevance {} is outside [0, 1]", self.relevance))
        }
    }
}

impl CsvRecord for GenomeTagRow {
    const FILE_NAME: &'static str = "genome-tags.csv";
    const COLUMNS: &'static [&'static str] = &["tagId", "tag"];
}

/// All six source file names, in the order they are checked at startup
pub const SOURCE_FILES: [&str; 6] = [
    RatingRow::FILE_NAME,
    TagRow::FILE_NAME,
    LinkRow::FILE_NAME,
    MovieRow::FILE_NAME,
    GenomeScoreRow::FILE_NAME,
    GenomeTagRow::FILE_NAME,
];

/// Lazy iterator of typed rows over one CSV source.
///
/// Yields `Err` at most once: after a failure the iterator is exhausted.
pub struct RecordReader<T, R = File> {
    file: String,
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
    done: bool,
    _row: PhantomData<T>,
}

impl<T: CsvRecord> RecordReader<T, File> {
    /// Open `T::FILE_NAME` inside `dir`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        Self::open(&dir.join(T::FILE_NAME))
    }

    /// Open a source file at an explicit path.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DataLoadError::MissingFile {
                path: path.display().to_string(),
            },
            _ => DataLoadError::Io {
                file: T::FILE_NAME.to_string(),
                source: e,
            },
        })?;
        Self::from_reader(T::FILE_NAME, file)
    }
}

impl<T: CsvRecord, R: Read> RecordReader<T, R> {
    /// Wrap any reader. `file` is only used in error messages.
    pub fn from_reader(file: impl Into<String>, source: R) -> Result<Self> {
        let file = file.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .buffer_capacity(1 << 16)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| csv_error(&file, e))?
            .clone();

        // Extra columns are fine, missing ones are not
        for column in T::COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(DataLoadError::MissingColumn {
                    file,
                    column: column.to_string(),
                });
            }
        }

        Ok(Self {
            file,
            reader,
            headers,
            record: StringRecord::new(),
            done: false,
            _row: PhantomData,
        })
    }

    fn decode_current(&self) -> Result<T> {
        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = self
            .record
            .deserialize(Some(&self.headers))
            .map_err(|e| DataLoadError::Parse {
                file: self.file.clone(),
                line,
                reason: deserialize_reason(&e),
            })?;

        row.validate().map_err(|reason| DataLoadError::Parse {
            file: self.file.clone(),
            line,
            reason,
        })?;

        Ok(row)
    }
}

impl<T: CsvRecord, R: Read> Iterator for RecordReader<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = match self.reader.read_record(&mut self.record) {
            Ok(false) => {
                self.done = true;
                return None;
            }
            Ok(true) => self.decode_current(),
            Err(e) => Err(csv_error(&self.file, e)),
        };

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Read a whole (small) table into memory
pub fn read_table<T: CsvRecord>(dir: &Path) -> Result<Vec<T>> {
    RecordReader::<T>::open_in(dir)?.collect()
}

/// Convert a reader-level csv error (I/O, bad UTF-8, ragged row)
fn csv_error(file: &str, err: csv::Error) -> DataLoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => DataLoadError::Io {
            file: file.to_string(),
            source,
        },
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => DataLoadError::Parse {
            file: file.to_string(),
            line,
            reason: format!("expected {} fields but found {}", expected_len, len),
        },
        _ => DataLoadError::Parse {
            file: file.to_string(),
            line,
            reason,
        },
    }
}

/// Strip the csv crate's position prefix, we report the line ourselves
fn deserialize_reason(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    }
}
