//! Flat-text snapshots of the catalog and the playback history
//!
//! Each track is written as a block of labeled lines ended by `---`:
//!
//! ```text
//! ID: song_003
//! Title: Imagine
//! Artist: John Lennon
//! Duration: 3:03
//! Rating: 5/5
//! Album:
//! Genre: Pop
//! Added: 2024-01-01T00:00:00+00:00
//! ---
//! ```
//!
//! Imports are best-effort. Records that fail to parse, fail validation or
//! collide with existing tracks are skipped and counted; only I/O failures
//! are returned as errors.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::history::History;
use crate::human_time::{format_duration, parse_duration};
use crate::track::{Track, MAX_RATING};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

const RECORD_END: &str = "---";

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids accepted, in file order
    pub imported: Vec<String>,
    /// Id or title + artist already present
    pub duplicates: usize,
    /// Parsed but failed the validity check
    pub invalid: usize,
    /// Could not be parsed
    pub malformed: usize,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn skipped(&self) -> usize {
        self.duplicates + self.invalid + self.malformed
    }
}

/// Write the catalog in id order
pub fn write_catalog<W: Write>(catalog: &Catalog, mut out: W) -> Result<()> {
    writeln!(out, "Song Database Export")?;
    writeln!(out, "====================")?;
    writeln!(out, "Total songs: {}", catalog.len())?;
    writeln!(out)?;
    for track in catalog.iter() {
        write_record(&mut out, track)?;
    }
    out.flush()?;
    Ok(())
}

/// Read track blocks into the catalog through [`Catalog::try_insert`]
pub fn read_catalog<R: BufRead>(catalog: &mut Catalog, input: R) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for record in parse_records(input)? {
        let track = match record {
            Ok(track) => track,
            Err(err) => {
                warn!(error = %err, "Skipping malformed record");
                report.malformed += 1;
                continue;
            }
        };
        let id = track.id.clone();
        match catalog.try_insert(track) {
            Ok(()) => report.imported.push(id),
            Err(err @ (Error::InvalidTrack(_) | Error::InvalidRating(_))) => {
                warn!(track_id = %id, error = %err, "Skipping invalid record");
                report.invalid += 1;
            }
            Err(err) => {
                warn!(track_id = %id, error = %err, "Skipping duplicate record");
                report.duplicates += 1;
            }
        }
    }
    Ok(report)
}

/// Write the history oldest play first
pub fn write_history<W: Write>(history: &History, mut out: W) -> Result<()> {
    writeln!(out, "Playback History Export")?;
    writeln!(out, "=======================")?;
    writeln!(out, "Total songs: {}", history.len())?;
    writeln!(out, "Max size: {}", history.capacity())?;
    writeln!(out)?;
    for track in history.iter_chronological() {
        write_record(&mut out, track)?;
    }
    out.flush()?;
    Ok(())
}

/// Push every valid record onto the history in file order, so the last
/// record ends up on top
pub fn read_history<R: BufRead>(history: &mut History, input: R) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for record in parse_records(input)? {
        match record {
            Ok(track) if track.is_valid() => {
                report.imported.push(track.id.clone());
                history.push(track);
            }
            Ok(track) => {
                warn!(track_id = %track.id, "Skipping invalid history record");
                report.invalid += 1;
            }
            Err(err) => {
                warn!(error = %err, "Skipping malformed history record");
                report.malformed += 1;
            }
        }
    }
    Ok(report)
}

pub fn export_catalog_to_path(catalog: &Catalog, path: &Path) -> Result<()> {
    write_catalog(catalog, BufWriter::new(File::create(path)?))?;
    info!(path = %path.display(), tracks = catalog.len(), "Exported catalog");
    Ok(())
}

pub fn import_catalog_from_path(catalog: &mut Catalog, path: &Path) -> Result<ImportReport> {
    let report = read_catalog(catalog, BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        imported = report.imported_count(),
        skipped = report.skipped(),
        "Imported catalog"
    );
    Ok(report)
}

pub fn export_history_to_path(history: &History, path: &Path) -> Result<()> {
    write_history(history, BufWriter::new(File::create(path)?))?;
    info!(path = %path.display(), plays = history.len(), "Exported history");
    Ok(())
}

pub fn import_history_from_path(history: &mut History, path: &Path) -> Result<ImportReport> {
    let report = read_history(history, BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        imported = report.imported_count(),
        skipped = report.skipped(),
        "Imported history"
    );
    Ok(report)
}

fn write_record<W: Write>(out: &mut W, track: &Track) -> Result<()> {
    writeln!(out, "ID: {}", track.id)?;
    writeln!(out, "Title: {}", track.title)?;
    writeln!(out, "Artist: {}", track.artist)?;
    writeln!(out, "Duration: {}", format_duration(u64::from(track.duration_secs)))?;
    writeln!(out, "Rating: {}/{}", track.rating, MAX_RATING)?;
    writeln!(out, "Album: {}", track.album.as_deref().unwrap_or(""))?;
    writeln!(out, "Genre: {}", track.genre.as_deref().unwrap_or(""))?;
    writeln!(out, "Added: {}", track.added_at.to_rfc3339())?;
    writeln!(out, "{}", RECORD_END)?;
    Ok(())
}

/// Record being assembled from labeled lines
struct PendingRecord {
    line: usize,
    track: Track,
    has_duration: bool,
    error: Option<Error>,
}

impl PendingRecord {
    fn new(line: usize, id: &str) -> Self {
        Self {
            line,
            track: Track::new(id, "", "", 0),
            has_duration: false,
            error: None,
        }
    }

    fn fail(&mut self, line: usize, message: String) {
        if self.error.is_none() {
            self.error = Some(Error::Parse { line, message });
        }
    }

    fn apply(&mut self, line: usize, label: &str, value: &str) {
        match label {
            "Title" => self.track.title = value.to_string(),
            "Artist" => self.track.artist = value.to_string(),
            "Album" => self.track.album = non_empty(value),
            "Genre" => self.track.genre = non_empty(value),
            "Duration" => match parse_duration(value).and_then(|secs| u32::try_from(secs).ok()) {
                Some(secs) => {
                    self.track.duration_secs = secs;
                    self.has_duration = true;
                }
                None => self.fail(line, format!("bad duration '{}'", value)),
            },
            "Rating" => match parse_rating(value) {
                Some(rating) => self.track.rating = rating,
                None => self.fail(line, format!("bad rating '{}'", value)),
            },
            "Added" => match DateTime::parse_from_rfc3339(value.trim()) {
                Ok(added) => self.track.added_at = added.with_timezone(&Utc),
                Err(err) => self.fail(line, format!("bad timestamp '{}': {}", value, err)),
            },
            _ => {}
        }
    }

    fn finish(self) -> std::result::Result<Track, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.has_duration {
            return Err(Error::Parse {
                line: self.line,
                message: format!("record '{}' has no duration", self.track.id),
            });
        }
        Ok(self.track)
    }
}

/// Split input into per-record parse results. Lines outside a record (the
/// header) are ignored; a record missing its `---` is closed by the next
/// `ID:` line or the end of input.
fn parse_records<R: BufRead>(input: R) -> Result<Vec<std::result::Result<Track, Error>>> {
    let mut records = Vec::new();
    let mut pending: Option<PendingRecord> = None;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let line = line.strip_suffix('\r').unwrap_or(line.as_str());

        if line.trim_end() == RECORD_END {
            if let Some(record) = pending.take() {
                records.push(record.finish());
            }
            continue;
        }

        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        // Only the single separator space is dropped; text fields keep
        // their own leading and trailing whitespace
        let label = label.trim();
        let value = value.strip_prefix(' ').unwrap_or(value);

        if label == "ID" {
            if let Some(record) = pending.take() {
                records.push(record.finish());
            }
            pending = Some(PendingRecord::new(line_no, value.trim()));
        } else if let Some(record) = pending.as_mut() {
            record.apply(line_no, label, value);
        }
    }

    if let Some(record) = pending.take() {
        records.push(record.finish());
    }
    Ok(records)
}

/// "N/5" or a bare "N"; 0 means unrated
fn parse_rating(value: &str) -> Option<u8> {
    let number = value.split('/').next()?.trim();
    let rating = number.parse::<u8>().ok()?;
    (rating <= MAX_RATING).then_some(rating)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
