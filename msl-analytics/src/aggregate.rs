//! Pure aggregation over play events
//!
//! Every analytics endpoint fetches its window of play rows and hands
//! them to these functions. Sorting is deterministic: play count
//! descending, then song id ascending, so paginated/truncated output is
//! stable across calls.

use chrono::{DateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::db::PlayRow;

/// One trending entry
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSong {
    pub song_id: String,
    pub play_count: i64,
    pub average_duration: i64,
    pub last_played: String,
}

/// Group plays by song and rank by play count descending
pub fn trending(rows: &[PlayRow], limit: usize) -> Vec<TrendingSong> {
    #[derive(Default)]
    struct Acc {
        play_count: i64,
        total_duration: i64,
        last_played: String,
    }

    let mut by_song: BTreeMap<&str, Acc> = BTreeMap::new();
    for row in rows {
        let acc = by_song.entry(row.song_id.as_str()).or_default();
        acc.play_count += 1;
        acc.total_duration += row.duration;
        if row.timestamp > acc.last_played {
            acc.last_played = row.timestamp.clone();
        }
    }

    // BTreeMap iteration gives song-id-ascending order; the sort below is
    // stable, so ties keep that order
    let mut entries: Vec<TrendingSong> = by_song
        .into_iter()
        .map(|(song_id, acc)| TrendingSong {
            song_id: song_id.to_string(),
            play_count: acc.play_count,
            average_duration: average(acc.total_duration, acc.play_count),
            last_played: acc.last_played,
        })
        .collect();
    entries.sort_by(|a, b| b.play_count.cmp(&a.play_count));
    entries.truncate(limit);
    entries
}

/// One user's most played songs (top 10)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopSong {
    pub song_id: String,
    pub plays: i64,
}

pub fn top_songs(rows: &[PlayRow], limit: usize) -> Vec<TopSong> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.song_id.as_str()).or_default() += 1;
    }

    let mut entries: Vec<TopSong> = counts
        .into_iter()
        .map(|(song_id, plays)| TopSong {
            song_id: song_id.to_string(),
            plays,
        })
        .collect();
    entries.sort_by(|a, b| b.plays.cmp(&a.plays));
    entries.truncate(limit);
    entries
}

/// Plays bucketed by UTC hour of day
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TimeOfDay {
    pub morning: i64,
    pub afternoon: i64,
    pub evening: i64,
    pub night: i64,
}

impl TimeOfDay {
    /// The most played bucket; ties resolve to the later bucket in
    /// morning → afternoon → evening → night order
    pub fn favorite(&self) -> &'static str {
        let buckets = [
            ("morning", self.morning),
            ("afternoon", self.afternoon),
            ("evening", self.evening),
            ("night", self.night),
        ];
        buckets
            .into_iter()
            .reduce(|a, b| if a.1 > b.1 { a } else { b })
            .map(|(name, _)| name)
            .unwrap_or("morning")
    }
}

/// Bucket play timestamps: morning [5,12), afternoon [12,17), evening
/// [17,22), night otherwise. Unparseable timestamps count as night.
pub fn time_of_day(rows: &[PlayRow]) -> TimeOfDay {
    let mut buckets = TimeOfDay::default();
    for row in rows {
        let hour = DateTime::parse_from_rfc3339(&row.timestamp)
            .map(|dt| dt.with_timezone(&chrono::Utc).hour())
            .unwrap_or(0);
        match hour {
            5..=11 => buckets.morning += 1,
            12..=16 => buckets.afternoon += 1,
            17..=21 => buckets.evening += 1,
            _ => buckets.night += 1,
        }
    }
    buckets
}

/// Activity level from a period play count
pub fn activity_level(play_count: usize) -> &'static str {
    match play_count {
        n if n >= 100 => "high",
        n if n >= 30 => "medium",
        n if n >= 10 => "low",
        _ => "inactive",
    }
}

/// Distinct non-anonymous listeners
pub fn unique_listeners(rows: &[PlayRow]) -> usize {
    rows.iter()
        .filter(|row| row.user_id != "anonymous")
        .map(|row| row.user_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of play durations
pub fn total_duration(rows: &[PlayRow]) -> i64 {
    rows.iter().map(|row| row.duration).sum()
}

/// Rounded average, zero for an empty window
pub fn average(total: i64, count: i64) -> i64 {
    if count == 0 {
        0
    } else {
        (total as f64 / count as f64).round() as i64
    }
}

/// Count engagement events by kind
pub fn engagement_by_kind(kinds: &[String]) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for kind in kinds {
        *counts.entry(kind.clone()).or_default() += 1;
    }
    counts
}
