//! Flat-text snapshot tests against real files

use playwise_core::config::DataDirInitializer;
use playwise_core::snapshot;
use playwise_core::{Catalog, Error, Library, Track};
use tempfile::TempDir;

#[test]
fn test_library_catalog_round_trip() {
    let dir = TempDir::new().unwrap();
    let files = DataDirInitializer::new(dir.path().join("data"));
    files.ensure_directory_exists().unwrap();

    let mut library = Library::default();
    library.load_sample_data();
    library.export_catalog(&files.catalog_path()).unwrap();
    assert!(files.catalog_exists());

    let mut restored = Library::default();
    let report = restored.import_catalog(&files.catalog_path()).unwrap();
    assert_eq!(report.imported_count(), 7);
    assert_eq!(report.skipped(), 0);

    assert_eq!(restored.catalog().len(), 7);
    assert_eq!(restored.playlist().len(), 7);
    assert_eq!(restored.rating_index().total_count(), 7);
    for original in library.catalog().iter() {
        let copy = restored.catalog().find_by_id(&original.id).unwrap();
        assert_eq!(copy.title, original.title);
        assert_eq!(copy.artist, original.artist);
        assert_eq!(copy.duration_secs, original.duration_secs);
        assert_eq!(copy.rating, original.rating);
        assert_eq!(copy.album, original.album);
        assert_eq!(copy.genre, original.genre);
    }
}

#[test]
fn test_reimport_skips_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.txt");

    let mut library = Library::default();
    library.load_sample_data();
    library.export_catalog(&path).unwrap();

    let report = library.import_catalog(&path).unwrap();
    assert_eq!(report.imported_count(), 0);
    assert_eq!(report.duplicates, 7);
    assert_eq!(library.playlist().len(), 7);
}

#[test]
fn test_history_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.txt");

    let mut library = Library::default();
    library.load_sample_data();
    library.play("song_006", None).unwrap();
    library.export_history(&path).unwrap();

    let mut restored = Library::default();
    let report = restored.import_history(&path).unwrap();
    assert_eq!(report.imported, vec!["song_001", "song_002", "song_003", "song_006"]);
    assert_eq!(restored.history().peek().unwrap().id, "song_006");
    assert_eq!(restored.undo_last_play().unwrap().title, "Hey Jude");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut catalog = Catalog::new();
    let result = snapshot::import_catalog_from_path(&mut catalog, &dir.path().join("absent.txt"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_hand_written_file_with_extra_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.txt");
    std::fs::write(
        &path,
        "Song Database Export\n\
         ====================\n\
         Total songs: 2\n\
         \n\
         ID: long\n\
         Title: Epic\n\
         Artist: Band\n\
         Duration: 1:02:03\n\
         Rating: 4/5\n\
         Mood: happy\n\
         ---\n\
         ID: broken\n\
         Title: Broken\n\
         Artist: Band\n\
         Duration: 1:75\n\
         ---\n",
    )
    .unwrap();

    let mut catalog = Catalog::new();
    let report = snapshot::import_catalog_from_path(&mut catalog, &path).unwrap();
    assert_eq!(report.imported, vec!["long"]);
    assert_eq!(report.malformed, 1);
    let epic: &Track = catalog.find_by_id("long").unwrap();
    assert_eq!(epic.duration_secs, 3723);
    assert_eq!(epic.duration_string(), "1:02:03");
}
