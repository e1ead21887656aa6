//! Scripted shell sessions against an in-memory output buffer

use playwise_cli::{Shell, ShellControl};
use playwise_core::Library;
use std::io::Cursor;
use tempfile::TempDir;

fn sample_shell() -> Shell<Vec<u8>> {
    let mut library = Library::default();
    library.load_sample_data();
    Shell::new(library, Vec::new())
}

fn run_script(shell: &mut Shell<Vec<u8>>, lines: &[&str]) {
    for line in lines {
        shell.run_line(line).unwrap();
    }
}

fn output(shell: Shell<Vec<u8>>) -> String {
    String::from_utf8(shell.into_parts().1).unwrap()
}

#[test]
fn test_run_reads_until_quit() {
    let mut shell = Shell::new(Library::default(), Vec::new());
    let input = Cursor::new("add Imagine | John Lennon | 3:03 | 5\nlist\nquit\nlist\n");
    shell.run(input).unwrap();

    let (library, out) = shell.into_parts();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(library.catalog().len(), 1);
    assert!(text.starts_with("playwise> "));
    assert!(text.contains("Imagine - John Lennon (3:03) [Rating: 5/5]"));
    assert!(text.contains("Playlist: My Playlist (1 tracks)"));
    assert_eq!(text.matches("Playlist:").count(), 1);
    assert!(text.ends_with("Goodbye!\n"));
}

#[test]
fn test_run_stops_at_end_of_input() {
    let mut shell = sample_shell();
    shell.run(Cursor::new("reverse\n")).unwrap();
    let text = output(shell);
    assert!(text.contains("Playlist reversed"));
    assert!(!text.contains("Goodbye!"));
}

#[test]
fn test_play_undo_and_history() {
    let mut shell = sample_shell();
    run_script(
        &mut shell,
        &["play song_006 120", "history 2", "undo", "undo", "history"],
    );
    assert_eq!(shell.library().history().len(), 2);

    let text = output(shell);
    assert!(text.contains("Now playing: Hey Jude - The Beatles (7:11)"));
    assert!(text.contains("Recent plays (2 of 4):"));
    assert!(text.contains("Undid play: Hey Jude"));
    assert!(text.contains("Undid play: Imagine"));
    assert!(text.contains("Recent plays (2 of 2):"));
}

#[test]
fn test_unknown_track_is_reported() {
    let mut shell = sample_shell();
    run_script(&mut shell, &["play song_999", "remove song_999", "rate song_999 3"]);
    let text = output(shell);
    assert_eq!(text.matches("Error:").count(), 3);
}

#[test]
fn test_rate_updates_top_rated() {
    let mut shell = sample_shell();
    run_script(&mut shell, &["rate song_007 5", "top 10"]);
    assert_eq!(shell.library().rating_index().songs_at(5).len(), 5);

    let text = output(shell);
    assert!(text.contains("Rated Sweet Child O' Mine: 5/5"));
    assert!(text.contains("Top rated:"));
    assert!(text.contains("7. [song_005] Yesterday"));
}

#[test]
fn test_playlist_editing() {
    let mut shell = sample_shell();
    run_script(
        &mut shell,
        &["move 7 1", "delete 2", "delete 9", "sort duration desc quick"],
    );

    let playlist = shell.library().playlist();
    assert_eq!(playlist.len(), 6);
    assert_eq!(playlist.get(0).unwrap().id, "song_004");
    assert_eq!(playlist.get(5).unwrap().id, "song_005");

    let text = output(shell);
    assert!(text.contains("Moved track 7 -> 1"));
    assert!(text.contains("Deleted Bohemian Rhapsody - Queen"));
    assert!(text.contains("Error: no track at position 9"));
    assert!(text.contains("(Quick sort)"));
}

#[test]
fn test_remove_drops_track_everywhere() {
    let mut shell = sample_shell();
    run_script(&mut shell, &["remove song_004", "search stairway"]);

    let library = shell.library();
    assert!(!library.catalog().contains("song_004"));
    assert!(!library.playlist().contains_id("song_004"));

    let text = output(shell);
    assert!(text.contains("Removed Stairway to Heaven"));
    assert!(text.contains("Found 0 tracks for 'stairway'"));
}

#[test]
fn test_search_and_favorites() {
    let mut shell = sample_shell();
    run_script(&mut shell, &["search the beatles", "play song_005 600", "favorites 1"]);

    let text = output(shell);
    assert!(text.contains("Found 2 tracks for 'the beatles'"));
    assert!(text.contains("Favorites (by listening time):"));
    assert!(text.contains("1. Yesterday - The Beatles: 10 min 0 sec, 1 plays"));
}

#[test]
fn test_dashboard_json_is_valid() {
    let mut shell = sample_shell();
    shell.run_line("dashboard json").unwrap();

    let text = output(shell);
    let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(value["total_tracks"], 7);
    assert_eq!(value["playlist_length"], 7);
    assert_eq!(value["history_plays"], 3);
}

#[test]
fn test_export_then_import_into_fresh_shell() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.txt");

    let mut shell = sample_shell();
    shell.run_line(&format!("export {}", path.display())).unwrap();
    assert!(output(shell).contains("Exported 7 tracks"));

    let import = format!("import {}", path.display());
    let mut fresh = Shell::new(Library::default(), Vec::new());
    run_script(&mut fresh, &[import.as_str(), import.as_str()]);
    assert_eq!(fresh.library().catalog().len(), 7);

    let text = output(fresh);
    assert!(text.contains("Imported 7 tracks"));
    assert!(text.contains("Imported 0 tracks"));
    assert!(text.contains("(7 skipped)"));
}

#[test]
fn test_import_missing_file_keeps_session() {
    let dir = TempDir::new().unwrap();
    let mut shell = sample_shell();
    let control = shell
        .run_line(&format!("import {}", dir.path().join("absent.txt").display()))
        .unwrap();
    assert_eq!(control, ShellControl::Continue);
    assert!(output(shell).contains("Error:"));
}

#[test]
fn test_dedupe_and_rebalance() {
    let mut shell = sample_shell();
    run_script(&mut shell, &["dedupe", "rebalance", "sample"]);
    let text = output(shell);
    assert!(text.contains("Removed 0 duplicates"));
    assert!(text.contains("Rating tree height"));
    assert!(text.contains("Loaded 0 sample tracks"));
}

#[test]
fn test_history_export_and_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.txt");

    let mut shell = sample_shell();
    shell.run_line(&format!("export-history {}", path.display())).unwrap();
    assert!(output(shell).contains("Exported 3 plays"));

    let mut fresh = Shell::new(Library::default(), Vec::new());
    fresh.run_line(&format!("import-history {}", path.display())).unwrap();
    assert_eq!(fresh.library().history().len(), 3);
    assert_eq!(fresh.library().history().peek().unwrap().id, "song_003");
    assert!(output(fresh).contains("Imported 3 plays"));
}

#[test]
fn test_report_writes_dashboard_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    let mut shell = sample_shell();
    shell.run_line(&format!("report {}", path.display())).unwrap();
    assert!(output(shell).contains("Saved dashboard report"));

    let report = std::fs::read_to_string(&path).unwrap();
    assert!(report.starts_with("=== PlayWise Dashboard ==="));
    assert!(report.contains("Total songs: 7"));
}

#[test]
fn test_save_and_load_through_data_folder() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");

    let mut library = Library::default();
    library.load_sample_data();
    let mut shell = Shell::new(library, Vec::new()).with_data_dir(data.clone());
    run_script(&mut shell, &["play song_006 60", "save"]);
    assert!(output(shell).contains("Saved catalog, history and report"));
    assert!(data.join("catalog.txt").is_file());
    assert!(data.join("history.txt").is_file());
    assert!(data.join("report.txt").is_file());

    let mut fresh = Shell::new(Library::default(), Vec::new()).with_data_dir(data);
    fresh.run_line("load").unwrap();
    assert_eq!(fresh.library().catalog().len(), 7);
    assert_eq!(fresh.library().history().len(), 4);
    assert_eq!(fresh.library().history().peek().unwrap().id, "song_006");
    assert!(output(fresh).contains("Loaded 7 tracks and 4 plays"));
}

#[test]
fn test_save_without_folder_is_reported() {
    let mut shell = sample_shell();
    run_script(&mut shell, &["save", "load"]);
    let text = output(shell);
    assert_eq!(text.matches("Error: no folder given").count(), 2);
}

#[test]
fn test_add_with_out_of_range_rating_is_rejected() {
    let mut shell = sample_shell();
    shell.run_line("add Loud | Band | 3:00 | 9").unwrap();
    assert_eq!(shell.library().catalog().len(), 7);
    assert!(output(shell).contains("Error: Invalid rating: 9"));
}
