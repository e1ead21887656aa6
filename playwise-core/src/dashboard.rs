//! Dashboard statistics
//!
//! A read-only snapshot of aggregate numbers across every container, rendered
//! as text through `Display` or as JSON through serde.

use crate::error::Result;
use crate::favorites::FavoriteEntry;
use crate::human_time::{format_duration, format_listening_time};
use crate::library::Library;
use crate::track::{Track, MAX_RATING, MIN_RATING};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

const TOP_COUNT: usize = 5;

/// Name with an occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Point-in-time statistics for a [`Library`]
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub total_tracks: usize,
    pub playlist_name: String,
    pub playlist_length: usize,
    /// Sum of catalog track durations
    pub total_play_time_secs: u64,
    /// Mean over rated tracks only, 0.0 when none are rated
    pub average_rating: f64,
    /// Catalog tracks per rating; 0 counts unrated tracks
    pub rating_histogram: BTreeMap<u8, usize>,
    pub longest_tracks: Vec<Track>,
    pub recent_plays: Vec<Track>,
    pub history_plays: usize,
    pub history_capacity: usize,
    pub most_common_artist: Option<String>,
    pub top_artists: Vec<NameCount>,
    pub top_genres: Vec<NameCount>,
    pub rating_tree_height: usize,
    pub most_common_rating: Option<u8>,
    pub favorites: Vec<FavoriteEntry>,
    pub total_listening_secs: u64,
}

impl DashboardSnapshot {
    pub fn capture(library: &Library) -> Self {
        let catalog = library.catalog();
        let tracks = catalog.all_tracks();

        let rated: Vec<u8> = tracks
            .iter()
            .filter(|track| track.is_rated())
            .map(|track| track.rating)
            .collect();
        let average_rating = if rated.is_empty() {
            0.0
        } else {
            rated.iter().map(|&r| f64::from(r)).sum::<f64>() / rated.len() as f64
        };

        let mut rating_histogram = BTreeMap::new();
        for track in &tracks {
            *rating_histogram.entry(track.rating).or_insert(0) += 1;
        }

        let mut longest_tracks = tracks.clone();
        longest_tracks.sort_by(|a, b| {
            b.duration_secs
                .cmp(&a.duration_secs)
                .then_with(|| a.cmp_title_artist(b))
        });
        longest_tracks.truncate(TOP_COUNT);

        let top_artists = rank_names(tracks.iter().map(|track| track.artist.as_str()));
        let top_genres = rank_names(tracks.iter().filter_map(|track| track.genre.as_deref()));

        Self {
            generated_at: Utc::now(),
            total_tracks: catalog.len(),
            playlist_name: library.playlist().name().to_string(),
            playlist_length: library.playlist().len(),
            total_play_time_secs: tracks.iter().map(|t| u64::from(t.duration_secs)).sum(),
            average_rating,
            rating_histogram,
            longest_tracks,
            recent_plays: library.history().recent(TOP_COUNT),
            history_plays: library.history().len(),
            history_capacity: library.history().capacity(),
            most_common_artist: top_artists.first().map(|entry| entry.name.clone()),
            top_artists: top_artists.into_iter().take(TOP_COUNT).collect(),
            top_genres: top_genres.into_iter().take(TOP_COUNT).collect(),
            rating_tree_height: library.rating_index().height(),
            most_common_rating: library.rating_index().most_common_rating(),
            favorites: library.favorites().entries().take(TOP_COUNT).cloned().collect(),
            total_listening_secs: library.favorites().total_listening_time(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the text report to a file, replacing it
    pub fn export_to_path(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        info!(path = %path.display(), "Exported dashboard report");
        Ok(())
    }
}

/// Count names, most frequent first, ties alphabetical
fn rank_names<'a, I>(names: I) -> Vec<NameCount>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    let mut ranked: Vec<NameCount> = counts
        .into_iter()
        .map(|(name, count)| NameCount {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}

impl fmt::Display for DashboardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PlayWise Dashboard ===")?;
        writeln!(f, "Total songs: {}", self.total_tracks)?;
        writeln!(f, "Playlist: {} ({} tracks)", self.playlist_name, self.playlist_length)?;
        writeln!(f, "Total play time: {}", format_duration(self.total_play_time_secs))?;
        writeln!(f, "Average rating: {:.2}/{}", self.average_rating, MAX_RATING)?;
        writeln!(f, "History: {} plays (capacity {})", self.history_plays, self.history_capacity)?;
        writeln!(
            f,
            "Most common artist: {}",
            self.most_common_artist.as_deref().unwrap_or("None")
        )?;

        writeln!(f)?;
        writeln!(f, "Top {} longest songs:", TOP_COUNT)?;
        write_numbered(f, &self.longest_tracks)?;

        writeln!(f)?;
        writeln!(f, "Recently played:")?;
        write_numbered(f, &self.recent_plays)?;

        writeln!(f)?;
        writeln!(f, "Songs by rating:")?;
        for rating in (MIN_RATING..=MAX_RATING).rev() {
            let count = self.rating_histogram.get(&rating).copied().unwrap_or(0);
            writeln!(f, "  {} stars: {}", rating, count)?;
        }
        if let Some(unrated) = self.rating_histogram.get(&0) {
            writeln!(f, "  unrated: {}", unrated)?;
        }
        match self.most_common_rating {
            Some(rating) => writeln!(f, "  Rating tree height {}, most common rating {}", self.rating_tree_height, rating)?,
            None => writeln!(f, "  Rating tree empty")?,
        }

        writeln!(f)?;
        writeln!(f, "Top artists:")?;
        for entry in &self.top_artists {
            writeln!(f, "  {}: {}", entry.name, entry.count)?;
        }
        writeln!(f, "Top genres:")?;
        for entry in &self.top_genres {
            writeln!(f, "  {}: {}", entry.name, entry.count)?;
        }

        writeln!(f)?;
        writeln!(f, "Favorites:")?;
        if self.favorites.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (rank, entry) in self.favorites.iter().enumerate() {
            writeln!(
                f,
                "  {}. {} - {}: {}, {} plays",
                rank + 1,
                entry.track.title,
                entry.track.artist,
                format_listening_time(entry.listening_secs),
                entry.play_count
            )?;
        }
        write!(f, "Total listening time: {}", format_listening_time(self.total_listening_secs))
    }
}

fn write_numbered(f: &mut fmt::Formatter<'_>, tracks: &[Track]) -> fmt::Result {
    if tracks.is_empty() {
        return writeln!(f, "  (none)");
    }
    for (index, track) in tracks.iter().enumerate() {
        writeln!(f, "  {}. {}", index + 1, track)?;
    }
    Ok(())
}
