// CSV export of the scoring history and the sanction log.
//
// Rows come out newest first, in the order the logs hold them.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::info;

use crate::game::{FoulEvent, ScoreEvent, StatisticsState};

/// Wall-clock format used for the timestamp column.
const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub timestamp: String,
    pub period: u32,
    pub team: String,
    pub delta: i32,
    #[serde(rename = "scoreA")]
    pub score_a: u32,
    #[serde(rename = "scoreB")]
    pub score_b: u32,
    pub player: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanctionRow {
    pub timestamp: String,
    pub period: u32,
    pub team: String,
    #[serde(rename = "type")]
    pub foul_type: String,
    pub player: String,
    pub number: String,
}

/// Local wall-clock time of an event, `HH:MM:SS`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

impl From<&ScoreEvent> for HistoryRow {
    fn from(event: &ScoreEvent) -> Self {
        HistoryRow {
            timestamp: format_timestamp(event.at),
            period: event.period,
            team: event.side.code().to_string(),
            delta: event.delta,
            score_a: event.score_home,
            score_b: event.score_away,
            player: event.player_name.clone(),
            number: event.player_number.clone(),
        }
    }
}

impl From<&FoulEvent> for SanctionRow {
    fn from(event: &FoulEvent) -> Self {
        SanctionRow {
            timestamp: format_timestamp(event.at),
            period: event.period,
            team: event.side.code().to_string(),
            foul_type: event.foul_type.label().to_string(),
            player: event.player_name.clone(),
            number: event.player_number.clone(),
        }
    }
}

pub fn history_rows(stats: &StatisticsState) -> Vec<HistoryRow> {
    stats.history.iter().map(HistoryRow::from).collect()
}

pub fn sanction_rows(stats: &StatisticsState) -> Vec<SanctionRow> {
    stats.sanctions.iter().map(SanctionRow::from).collect()
}

/// Write the scoring history as CSV with a header row.
pub fn write_history_csv<W: Write>(writer: W, stats: &StatisticsState) -> Result<(), csv::Error> {
    write_rows(writer, &history_rows(stats), HISTORY_HEADER)
}

/// Write the sanction log as CSV with a header row.
pub fn write_sanctions_csv<W: Write>(writer: W, stats: &StatisticsState) -> Result<(), csv::Error> {
    write_rows(writer, &sanction_rows(stats), SANCTIONS_HEADER)
}

const HISTORY_HEADER: &[&str] = &[
    "timestamp", "period", "team", "delta", "scoreA", "scoreB", "player", "number",
];
const SANCTIONS_HEADER: &[&str] = &["timestamp", "period", "team", "type", "player", "number"];

// Serde only emits headers once a row is serialized, so an empty log would
// produce an empty file. The header is written explicitly instead.
fn write_rows<W: Write, T: Serialize>(
    writer: W,
    rows: &[T],
    header: &[&str],
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Paths written by [`export_to_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub history: PathBuf,
    pub sanctions: PathBuf,
}

/// Write both logs into `dir` (created if missing), stamping file names with
/// `now` so earlier exports are kept.
pub fn export_to_dir(dir: &Path, stats: &StatisticsState, now: DateTime<Utc>) -> Result<ExportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let stamp = now.with_timezone(&Local).format("%Y%m%d_%H%M%S");
    let paths = ExportPaths {
        history: dir.join(format!("scoreboard_history_{stamp}.csv")),
        sanctions: dir.join(format!("scoreboard_sanctions_{stamp}.csv")),
    };

    let file = std::fs::File::create(&paths.history)
        .with_context(|| format!("failed to create {}", paths.history.display()))?;
    write_history_csv(file, stats)
        .with_context(|| format!("failed to write {}", paths.history.display()))?;

    let file = std::fs::File::create(&paths.sanctions)
        .with_context(|| format!("failed to create {}", paths.sanctions.display()))?;
    write_sanctions_csv(file, stats)
        .with_context(|| format!("failed to write {}", paths.sanctions.display()))?;

    info!(
        history = %paths.history.display(),
        sanctions = %paths.sanctions.display(),
        "exported match logs"
    );
    Ok(paths)
}
