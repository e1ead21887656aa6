//! Console shell
//!
//! Executes [`Command`]s against a [`Library`] and writes human-readable
//! output to any `Write`. Bad input and rejected operations are reported on
//! the output and never end the session.

use crate::command::{Command, HELP};
use playwise_core::config::DataDirInitializer;
use playwise_core::dashboard::DashboardSnapshot;
use playwise_core::human_time::format_listening_time;
use playwise_core::track::MAX_RATING;
use playwise_core::{Library, Track};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

const PROMPT: &str = "playwise> ";

/// Whether the session continues after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellControl {
    Continue,
    Quit,
}

/// Interactive shell over a library
pub struct Shell<W: Write> {
    library: Library,
    out: W,
    /// Default folder for `save` and `load`
    data_dir: Option<PathBuf>,
}

impl<W: Write> Shell<W> {
    pub fn new(library: Library, out: W) -> Self {
        Self {
            library,
            out,
            data_dir: None,
        }
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = Some(data_dir);
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn into_parts(self) -> (Library, W) {
        (self.library, self.out)
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        write!(self.out, "{}", PROMPT)?;
        self.out.flush()?;
        for line in input.lines() {
            if self.run_line(&line?)? == ShellControl::Quit {
                return Ok(());
            }
            write!(self.out, "{}", PROMPT)?;
            self.out.flush()?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Parse and execute one line; blank lines do nothing
    pub fn run_line(&mut self, line: &str) -> io::Result<ShellControl> {
        if line.trim().is_empty() {
            return Ok(ShellControl::Continue);
        }
        match line.parse::<Command>() {
            Ok(command) => self.execute(command),
            Err(err) => {
                writeln!(self.out, "Error: {}", err)?;
                Ok(ShellControl::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> io::Result<ShellControl> {
        debug!(command = ?command, "Executing shell command");
        match command {
            Command::Add {
                title,
                artist,
                duration_secs,
                rating,
            } => {
                let mut track = Track::with_generated_id(title, artist, duration_secs);
                if let Some(rating) = rating {
                    track.rating = rating;
                }
                let shown = track.clone();
                match self.library.add_track(track) {
                    Ok(()) => writeln!(self.out, "Added [{}] {}", shown.id, shown)?,
                    Err(err) => writeln!(self.out, "Error: {}", err)?,
                }
            }
            Command::List => self.list()?,
            Command::Play { id, listened_secs } => match self.library.play(&id, listened_secs) {
                Ok(track) => writeln!(self.out, "Now playing: {}", track)?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::Undo => match self.library.undo_last_play() {
                Some(track) => writeln!(self.out, "Undid play: {}", track)?,
                None => writeln!(self.out, "Nothing to undo")?,
            },
            Command::Rate { id, rating } => match self.library.rate_track(&id, rating) {
                Ok(track) => writeln!(self.out, "Rated {}: {}/{}", track.title, rating, MAX_RATING)?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::Move { from, to } => {
                let moved = match (from.checked_sub(1), to.checked_sub(1)) {
                    (Some(from), Some(to)) => self.library.playlist_mut().move_to(from, to),
                    _ => false,
                };
                if moved {
                    writeln!(self.out, "Moved track {} -> {}", from, to)?;
                } else {
                    writeln!(
                        self.out,
                        "Error: positions must be between 1 and {}",
                        self.library.playlist().len()
                    )?;
                }
            }
            Command::Reverse => {
                self.library.playlist_mut().reverse();
                writeln!(self.out, "Playlist reversed")?;
            }
            Command::Delete { position } => match position
                .checked_sub(1)
                .and_then(|index| self.library.playlist_mut().take_at(index))
            {
                Some(track) => writeln!(self.out, "Deleted {} from playlist", track)?,
                None => writeln!(self.out, "Error: no track at position {}", position)?,
            },
            Command::Remove { id } => match self.library.remove_track(&id) {
                Ok(track) => writeln!(self.out, "Removed {}", track)?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::Sort { criteria, algorithm } => {
                self.library.sort_playlist(criteria, algorithm);
                writeln!(self.out, "Sorted by {} ({:?} sort)", criteria, algorithm)?;
            }
            Command::Search { keyword } => {
                let found = self.library.catalog().find_by_keyword(&keyword);
                writeln!(self.out, "Found {} tracks for '{}'", found.len(), keyword)?;
                self.write_tracks(&found)?;
            }
            Command::Top { count } => {
                let top = self.library.rating_index().top_rated(count);
                writeln!(self.out, "Top rated:")?;
                self.write_tracks(&top)?;
            }
            Command::Favorites { count } => self.favorites(count)?,
            Command::History { count } => {
                let recent = self.library.history().recent(count);
                writeln!(
                    self.out,
                    "Recent plays ({} of {}):",
                    recent.len(),
                    self.library.history().len()
                )?;
                self.write_tracks(&recent)?;
            }
            Command::Dashboard { json } => {
                let snapshot = DashboardSnapshot::capture(&self.library);
                if json {
                    match snapshot.to_json() {
                        Ok(text) => writeln!(self.out, "{}", text)?,
                        Err(err) => writeln!(self.out, "Error: {}", err)?,
                    }
                } else {
                    writeln!(self.out, "{}", snapshot)?;
                }
            }
            Command::Export { path } => match self.library.export_catalog(&path) {
                Ok(()) => writeln!(
                    self.out,
                    "Exported {} tracks to {}",
                    self.library.catalog().len(),
                    path.display()
                )?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::Import { path } => match self.library.import_catalog(&path) {
                Ok(report) => writeln!(
                    self.out,
                    "Imported {} tracks from {} ({} skipped)",
                    report.imported_count(),
                    path.display(),
                    report.skipped()
                )?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::ExportHistory { path } => match self.library.export_history(&path) {
                Ok(()) => writeln!(
                    self.out,
                    "Exported {} plays to {}",
                    self.library.history().len(),
                    path.display()
                )?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::ImportHistory { path } => match self.library.import_history(&path) {
                Ok(report) => writeln!(
                    self.out,
                    "Imported {} plays from {} ({} skipped)",
                    report.imported_count(),
                    path.display(),
                    report.skipped()
                )?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::Report { path } => match self.library.export_report(&path) {
                Ok(()) => writeln!(self.out, "Saved dashboard report to {}", path.display())?,
                Err(err) => writeln!(self.out, "Error: {}", err)?,
            },
            Command::Save { dir } => match self.folder(dir) {
                Some(folder) => match self.save(&folder) {
                    Ok(()) => writeln!(
                        self.out,
                        "Saved catalog, history and report to {}",
                        folder.root().display()
                    )?,
                    Err(err) => writeln!(self.out, "Error: {}", err)?,
                },
                None => writeln!(self.out, "Error: no folder given and no data folder configured")?,
            },
            Command::Load { dir } => match self.folder(dir) {
                Some(folder) => self.load(&folder)?,
                None => writeln!(self.out, "Error: no folder given and no data folder configured")?,
            },
            Command::Dedupe => {
                let removed = self.library.dedupe_playlist();
                writeln!(self.out, "Removed {} duplicates", removed)?;
            }
            Command::Shuffle => {
                self.library.playlist_mut().shuffle();
                writeln!(self.out, "Playlist shuffled")?;
            }
            Command::Rebalance => {
                let before = self.library.rating_index().height();
                self.library.rebalance_ratings();
                writeln!(
                    self.out,
                    "Rating tree height {} -> {}",
                    before,
                    self.library.rating_index().height()
                )?;
            }
            Command::Sample => {
                let added = self.library.load_sample_data();
                writeln!(self.out, "Loaded {} sample tracks", added)?;
            }
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => {
                writeln!(self.out, "Goodbye!")?;
                return Ok(ShellControl::Quit);
            }
        }
        Ok(ShellControl::Continue)
    }

    fn folder(&self, dir: Option<PathBuf>) -> Option<DataDirInitializer> {
        dir.or_else(|| self.data_dir.clone()).map(DataDirInitializer::new)
    }

    fn save(&self, folder: &DataDirInitializer) -> playwise_core::Result<()> {
        folder.ensure_directory_exists()?;
        self.library.export_catalog(&folder.catalog_path())?;
        self.library.export_history(&folder.history_path())?;
        self.library.export_report(&folder.report_path())
    }

    /// Catalog is required; the history file is read when present
    fn load(&mut self, folder: &DataDirInitializer) -> io::Result<()> {
        let catalog = match self.library.import_catalog(&folder.catalog_path()) {
            Ok(report) => report,
            Err(err) => return writeln!(self.out, "Error: {}", err),
        };
        let history = if folder.history_exists() {
            match self.library.import_history(&folder.history_path()) {
                Ok(report) => Some(report),
                Err(err) => return writeln!(self.out, "Error: {}", err),
            }
        } else {
            None
        };

        let plays = history.as_ref().map_or(0, |report| report.imported_count());
        let skipped = catalog.skipped() + history.as_ref().map_or(0, |report| report.skipped());
        writeln!(
            self.out,
            "Loaded {} tracks and {} plays from {} ({} skipped)",
            catalog.imported_count(),
            plays,
            folder.root().display(),
            skipped
        )
    }

    fn list(&mut self) -> io::Result<()> {
        let playlist = self.library.playlist();
        writeln!(self.out, "Playlist: {} ({} tracks)", playlist.name(), playlist.len())?;
        if playlist.is_empty() {
            writeln!(self.out, "  (empty)")?;
        }
        for (index, track) in playlist.iter().enumerate() {
            writeln!(self.out, "  {}. [{}] {}", index + 1, track.id, track)?;
        }
        Ok(())
    }

    fn favorites(&mut self, count: usize) -> io::Result<()> {
        let favorites = self.library.favorites();
        writeln!(self.out, "Favorites (by listening time):")?;
        if favorites.is_empty() {
            writeln!(self.out, "  (none)")?;
        }
        for (rank, entry) in favorites.entries().take(count).enumerate() {
            writeln!(
                self.out,
                "  {}. {} - {}: {}, {} plays",
                rank + 1,
                entry.track.title,
                entry.track.artist,
                format_listening_time(entry.listening_secs),
                entry.play_count
            )?;
        }
        Ok(())
    }

    fn write_tracks(&mut self, tracks: &[Track]) -> io::Result<()> {
        for (index, track) in tracks.iter().enumerate() {
            writeln!(self.out, "  {}. [{}] {}", index + 1, track.id, track)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell<Vec<u8>> {
        let mut library = Library::default();
        library.load_sample_data();
        Shell::new(library, Vec::new())
    }

    fn output(shell: Shell<Vec<u8>>) -> String {
        String::from_utf8(shell.into_parts().1).unwrap()
    }

    #[test]
    fn test_bad_input_is_reported_not_fatal() {
        let mut shell = shell();
        assert_eq!(shell.run_line("dance").unwrap(), ShellControl::Continue);
        assert_eq!(shell.run_line("rate song_001 9").unwrap(), ShellControl::Continue);
        assert_eq!(shell.run_line("").unwrap(), ShellControl::Continue);
        let text = output(shell);
        assert!(text.contains("Error: Unknown command: dance"));
        assert!(text.contains("Error: Invalid rating: 9"));
    }

    #[test]
    fn test_move_out_of_range() {
        let mut shell = shell();
        shell.run_line("move 1 99").unwrap();
        assert!(output(shell).contains("Error: positions must be between 1 and 7"));
    }

    #[test]
    fn test_quit() {
        let mut shell = shell();
        assert_eq!(shell.run_line("quit").unwrap(), ShellControl::Quit);
        assert!(output(shell).ends_with("Goodbye!\n"));
    }
}
