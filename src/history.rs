use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::session::SessionSummary;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Format of the save-level `timestamp` field
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One finished session, frozen at the moment it ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub score: i64,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy_pct: f64,
    pub avg_response_time: f64,
    pub fastest_response: f64,
    pub slowest_response: f64,
    /// Session end for live entries; the file's save time for loaded ones
    pub timestamp: Option<NaiveDateTime>,
}

impl HistoryEntry {
    pub fn from_summary(summary: &SessionSummary, timestamp: NaiveDateTime) -> Self {
        Self {
            score: summary.score,
            correct: summary.correct,
            wrong: summary.wrong,
            accuracy_pct: summary.accuracy_pct,
            avg_response_time: summary.avg_response_time,
            fastest_response: summary.fastest_response,
            slowest_response: summary.slowest_response,
            timestamp: Some(timestamp),
        }
    }
}

/// Past sessions, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn best_score(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.score).max()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_stats_file(&self, saved_at: NaiveDateTime) -> StatsFile {
        let column = |f: fn(&HistoryEntry) -> f64| -> Vec<f64> {
            self.entries.iter().map(f).collect()
        };
        StatsFile {
            score_history: Some(self.entries.iter().map(|e| e.score).collect()),
            accuracy_history: Some(column(|e| e.accuracy_pct)),
            correct_clicks_history: Some(self.entries.iter().map(|e| e.correct).collect()),
            wrong_clicks_history: Some(self.entries.iter().map(|e| e.wrong).collect()),
            avg_time_history: Some(column(|e| e.avg_response_time)),
            fastest_time_history: Some(column(|e| e.fastest_response)),
            slowest_time_history: Some(column(|e| e.slowest_response)),
            timestamp: Some(saved_at.format(TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// Rebuild a log from the column layout. Fails without producing
    /// anything if a column is missing or the columns disagree on length.
    pub fn from_stats_file(file: StatsFile) -> Result<(Self, Option<NaiveDateTime>)> {
        let scores = require("score_history", file.score_history)?;
        let accuracy = require("accuracy_history", file.accuracy_history)?;
        let correct = require("correct_clicks_history", file.correct_clicks_history)?;
        let wrong = require("wrong_clicks_history", file.wrong_clicks_history)?;
        let avg = require("avg_time_history", file.avg_time_history)?;
        let fastest = require("fastest_time_history", file.fastest_time_history)?;
        let slowest = require("slowest_time_history", file.slowest_time_history)?;

        let expected = scores.len();
        check_len("accuracy_history", expected, accuracy.len())?;
        check_len("correct_clicks_history", expected, correct.len())?;
        check_len("wrong_clicks_history", expected, wrong.len())?;
        check_len("avg_time_history", expected, avg.len())?;
        check_len("fastest_time_history", expected, fastest.len())?;
        check_len("slowest_time_history", expected, slowest.len())?;

        let saved_at = file.timestamp.as_deref().and_then(|ts| {
            match NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!(
                        timestamp = ts,
                        error = %e,
                        "ignoring unreadable save timestamp"
                    );
                    None
                }
            }
        });

        let entries = (0..expected)
            .map(|i| HistoryEntry {
                score: scores[i],
                correct: correct[i],
                wrong: wrong[i],
                accuracy_pct: accuracy[i],
                avg_response_time: avg[i],
                fastest_response: fastest[i],
                slowest_response: slowest[i],
                timestamp: saved_at,
            })
            .collect();

        Ok((Self { entries }, saved_at))
    }
}

fn require<T>(field: &'static str, column: Option<Vec<T>>) -> Result<Vec<T>> {
    column.ok_or(Error::MissingField(field))
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

/// On-disk layout: one array per metric plus a save timestamp.
///
/// Columns are optional here so a missing key can be reported by name
/// instead of as a generic parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsFile {
    #[serde(default)]
    pub score_history: Option<Vec<i64>>,
    #[serde(default)]
    pub accuracy_history: Option<Vec<f64>>,
    #[serde(default)]
    pub correct_clicks_history: Option<Vec<u32>>,
    #[serde(default)]
    pub wrong_clicks_history: Option<Vec<u32>>,
    #[serde(default)]
    pub avg_time_history: Option<Vec<f64>>,
    #[serde(default)]
    pub fastest_time_history: Option<Vec<f64>>,
    #[serde(default)]
    pub slowest_time_history: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Result of reading a statistics file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedHistory {
    pub log: HistoryLog,
    pub saved_at: Option<NaiveDateTime>,
}

/// JSON statistics file at a fixed location
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path()
                .unwrap_or_else(|| PathBuf::from("coordrill_history.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the whole file.
    pub fn save(&self, log: &HistoryLog, saved_at: NaiveDateTime) -> Result<()> {
        if log.is_empty() {
            return Err(Error::NothingToSave);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&log.to_stats_file(saved_at))
            .map_err(Error::MalformedJson)?;
        fs::write(&self.path, data)?;

        tracing::info!(path = %self.path.display(), sessions = log.len(), "saved history");
        Ok(())
    }

    pub fn load(&self) -> Result<LoadedHistory> {
        let bytes = fs::read(&self.path)?;
        let file: StatsFile = serde_json::from_slice(&bytes).map_err(Error::MalformedJson)?;
        let (log, saved_at) = HistoryLog::from_stats_file(file)?;

        tracing::info!(path = %self.path.display(), sessions = log.len(), "loaded history");
        Ok(LoadedHistory { log, saved_at })
    }
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self::new()
    }
}
