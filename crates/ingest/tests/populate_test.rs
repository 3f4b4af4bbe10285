//! Integration tests for a full load.
//!
//! Each test writes a small MovieLens-shaped folder to a temp dir and runs
//! `populate` against an in-memory store.

use data_loader::{DataLoadError, MovieDocument, MovieId, RatingFact};
use ingest::{IngestError, LoadConfig, populate};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use store::{DocumentSink, InMemoryStore, MOVIE_INDEXES, StoreError};
use tempfile::TempDir;

const RATINGS: &str = "userId,movieId,rating,timestamp
3,1,4.0,100
7,1,3.5,50
1,2,2.5,964982703
9,6,5.0,964982931
4,404,1.0,964983000
";

const TAGS: &str = "userId,movieId,tag,timestamp
2,1,pixar,1445714994
18,6,\"heist, crime\",1457433526
";

const LINKS: &str = "movieId,imdbId,tmdbId
1,0114709,862
2,0113497,8844
6,0113277,949
26,0114057,
77,0000077,77
";

const MOVIES: &str = "movieId,title,genres
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
2,Jumanji (1995),Adventure|Children|Fantasy
6,Heat (1995),Action|Crime|Thriller
26,\"Othello (Child's Play) (1997)\",
404,Not Linked (2001),Drama
";

const GENOME_SCORES: &str = "movieId,tagId,relevance
1,2,0.5
1,99,0.75
1,1,0.025
6,1,0.3
";

const GENOME_TAGS: &str = "tagId,tag
1,007
2,007 (series)
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn write_folder(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn movielens_folder() -> TempDir {
    write_folder(&[
        ("ratings.csv", RATINGS),
        ("tags.csv", TAGS),
        ("links.csv", LINKS),
        ("movies.csv", MOVIES),
        ("genome-scores.csv", GENOME_SCORES),
        ("genome-tags.csv", GENOME_TAGS),
    ])
}

fn headers_only_folder() -> TempDir {
    write_folder(&[
        ("ratings.csv", "userId,movieId,rating,timestamp\n"),
        ("tags.csv", "userId,movieId,tag,timestamp\n"),
        ("links.csv", "movieId,imdbId,tmdbId\n"),
        ("movies.csv", "movieId,title,genres\n"),
        ("genome-scores.csv", "movieId,tagId,relevance\n"),
        ("genome-tags.csv", "tagId,tag\n"),
    ])
}

fn by_id(documents: &[MovieDocument], movie_id: MovieId) -> &MovieDocument {
    documents
        .iter()
        .find(|d| d.movie_id == movie_id)
        .unwrap_or_else(|| panic!("movie {movie_id} missing"))
}

async fn load(
    dir: &Path,
    store: &mut InMemoryStore,
    batch_size: usize,
) -> ingest::Result<ingest::LoadSummary> {
    init_tracing();
    let config = LoadConfig::default()
        .with_batch_size(batch_size)
        .with_channel_capacity(2);
    populate(dir, store, &config).await
}

#[tokio::test]
async fn test_full_load_materializes_inner_join() {
    let dir = movielens_folder();
    let mut store = InMemoryStore::new();

    let summary = load(dir.path(), &mut store, 2).await.unwrap();
    assert_eq!(summary.write.documents, 4);
    assert_eq!(summary.write.batches, 2);
    assert_eq!(summary.indexes, 5);

    let documents = store.movie_documents().unwrap();
    let ids: Vec<MovieId> = documents.iter().map(|d| d.movie_id).collect();
    // movies.csv order, movie 404 (no link) and 77 (no movie) are excluded
    assert_eq!(ids, vec![1, 2, 6, 26]);
    let unique: HashSet<MovieId> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    assert_eq!(store.indexes(), MOVIE_INDEXES.as_slice());
}

#[tokio::test]
async fn test_document_contents() {
    let dir = movielens_folder();
    let mut store = InMemoryStore::new();
    load(dir.path(), &mut store, 1000).await.unwrap();
    let documents = store.movie_documents().unwrap();

    let toy_story = by_id(&documents, 1);
    assert_eq!(toy_story.title, "Toy Story");
    assert_eq!(toy_story.year, 1995);
    assert_eq!(toy_story.imdb_id, "0114709");
    assert_eq!(toy_story.tmdb_id, "862");
    assert_eq!(
        toy_story.ratings,
        vec![
            RatingFact {
                user_id: 3,
                rating: 4.0,
                timestamp: 100,
            },
            RatingFact {
                user_id: 7,
                rating: 3.5,
                timestamp: 50,
            },
        ]
    );
    assert_eq!(toy_story.tags[0].tag, "pixar");
    // tagId 99 has no label and is dropped, the rest keep file order
    let genome: Vec<(u32, &str, f64)> = toy_story
        .genome_tags
        .iter()
        .map(|g| (g.tag_id, g.tag.as_ref(), g.relevance))
        .collect();
    assert_eq!(genome, vec![(2, "007 (series)", 0.5), (1, "007", 0.025)]);

    let othello = by_id(&documents, 26);
    assert_eq!(othello.title, "Othello (Child's Play)");
    assert_eq!(othello.year, 1997);
    assert_eq!(othello.genres, vec![""]);
    assert_eq!(othello.tmdb_id, "");
    assert!(othello.ratings.is_empty());

    let heat = by_id(&documents, 6);
    assert_eq!(heat.genres, vec!["Action", "Crime", "Thriller"]);
    assert_eq!(heat.tags[0].tag, "heist, crime");
}

#[tokio::test]
async fn test_empty_fact_lists_are_stored_as_arrays() {
    let dir = movielens_folder();
    let mut store = InMemoryStore::new();
    load(dir.path(), &mut store, 1000).await.unwrap();

    // Jumanji has ratings only
    let jumanji = store
        .documents()
        .iter()
        .find(|d| d.get_str("title").ok() == Some("Jumanji"))
        .unwrap();
    assert_eq!(jumanji.get_array("ratings").unwrap().len(), 1);
    assert!(jumanji.get_array("tags").unwrap().is_empty());
    assert!(jumanji.get_array("genomeTags").unwrap().is_empty());
}

#[tokio::test]
async fn test_headers_only_still_builds_indexes() {
    let dir = headers_only_folder();
    let mut store = InMemoryStore::new();

    let summary = load(dir.path(), &mut store, 1000).await.unwrap();
    assert_eq!(summary.write.documents, 0);
    assert_eq!(summary.write.batches, 0);
    assert!(store.documents().is_empty());
    assert_eq!(store.indexes().len(), 5);
}

#[tokio::test]
async fn test_batch_size_does_not_change_the_collection() {
    let dir = movielens_folder();
    let mut one = InMemoryStore::new();
    let mut many = InMemoryStore::new();

    load(dir.path(), &mut one, 1).await.unwrap();
    load(dir.path(), &mut many, 1000).await.unwrap();

    assert_eq!(one.batches(), 4);
    assert_eq!(many.batches(), 1);
    assert_eq!(one.documents(), many.documents());
}

#[tokio::test]
async fn test_parse_error_aborts_before_any_write() {
    let dir = movielens_folder();
    fs::write(
        dir.path().join("ratings.csv"),
        "userId,movieId,rating,timestamp\n1,1,4.0,100\n1,2,four,100\n",
    )
    .unwrap();
    let mut store = InMemoryStore::new();

    let err = load(dir.path(), &mut store, 1000).await.unwrap_err();
    assert!(err.is_before_write());
    match err {
        IngestError::Data(DataLoadError::Parse { file, line, .. }) => {
            assert_eq!(file, "ratings.csv");
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.documents().is_empty());
    assert!(store.indexes().is_empty());
}

#[tokio::test]
async fn test_missing_file_is_named() {
    let dir = movielens_folder();
    fs::remove_file(dir.path().join("links.csv")).unwrap();
    let mut store = InMemoryStore::new();

    let err = load(dir.path(), &mut store, 1000).await.unwrap_err();
    assert!(err.to_string().contains("links.csv"), "{err}");
    assert!(matches!(err, IngestError::Data(DataLoadError::MissingFile { .. })));
}

#[tokio::test]
async fn test_duplicate_movie_is_merge_error() {
    let dir = movielens_folder();
    fs::write(
        dir.path().join("movies.csv"),
        "movieId,title,genres\n1,Toy Story (1995),Animation\n1,Toy Story (1995),Animation\n",
    )
    .unwrap();
    let mut store = InMemoryStore::new();

    let err = load(dir.path(), &mut store, 1000).await.unwrap_err();
    match &err {
        IngestError::Data(data) => assert!(data.is_merge_error()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.documents().is_empty());
}

#[tokio::test]
async fn test_non_empty_target_is_refused() {
    let dir = movielens_folder();
    let mut store = InMemoryStore::new();
    load(dir.path(), &mut store, 1000).await.unwrap();

    let err = load(dir.path(), &mut store, 1000).await.unwrap_err();
    assert!(err.is_before_write());
    assert!(matches!(
        err,
        IngestError::Preflight(StoreError::NotEmpty { count: 4, .. })
    ));
    assert_eq!(store.count_documents().await.unwrap(), 4);
}

#[tokio::test]
async fn test_failed_batch_keeps_earlier_batches_and_skips_indexes() {
    let dir = movielens_folder();
    let mut store = InMemoryStore::new().fail_on_batch(2);

    let err = load(dir.path(), &mut store, 1).await.unwrap_err();
    assert!(!err.is_before_write());
    match &err {
        IngestError::Write(store_err) => assert_eq!(store_err.failed_batch(), Some(2)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Batch 2"), "{err}");
    assert_eq!(store.documents().len(), 1);
    assert!(store.indexes().is_empty());
}

#[tokio::test]
async fn test_index_failure_keeps_documents() {
    let dir = movielens_folder();
    let mut store = InMemoryStore::new().fail_on_index("ratings.rating_1");

    let err = load(dir.path(), &mut store, 1000).await.unwrap_err();
    match &err {
        IngestError::Index { documents, source } => {
            assert_eq!(*documents, 4);
            assert!(matches!(source, StoreError::Indexes { failed: 1, total: 5, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.documents().len(), 4);
    assert_eq!(store.indexes().len(), 4);
}
