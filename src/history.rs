//! Per-bank-position results for the current process.

use crate::session::GameMetrics;
use crate::util::mean;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Recorded {
    metrics: GameMetrics,
    completed_at: DateTime<Local>,
}

/// Completed bank sessions keyed by bank index. Re-completing an index
/// replaces the earlier entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: BTreeMap<usize, Recorded>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// 1-based bank position.
    pub index: usize,
    pub wpm: u32,
    pub accuracy: f64,
    pub errors: usize,
    pub time: f64,
    pub completed_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Averages {
    pub wpm: f64,
    pub accuracy: f64,
    pub errors: f64,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub averages: Averages,
    pub results: Vec<SessionResult>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bank_index: usize, metrics: GameMetrics) {
        self.entries.insert(
            bank_index,
            Recorded {
                metrics,
                completed_at: Local::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, bank_index: usize) -> Option<&GameMetrics> {
        self.entries.get(&bank_index).map(|r| &r.metrics)
    }

    pub fn summary(&self, bank_total: usize) -> Summary {
        let results: Vec<SessionResult> = self
            .entries
            .iter()
            .map(|(idx, recorded)| SessionResult {
                index: idx + 1,
                wpm: recorded.metrics.wpm,
                accuracy: recorded.metrics.accuracy,
                errors: recorded.metrics.errors,
                time: recorded.metrics.elapsed_seconds,
                completed_at: recorded.completed_at,
            })
            .collect();

        let average = |field: fn(&SessionResult) -> f64| {
            let values: Vec<f64> = results.iter().map(field).collect();
            mean(&values).unwrap_or(0.0)
        };

        Summary {
            total: bank_total,
            completed: results.len(),
            averages: Averages {
                wpm: average(|r| r.wpm as f64),
                accuracy: average(|r| r.accuracy),
                errors: average(|r| r.errors as f64),
                time: average(|r| r.time),
            },
            results,
        }
    }
}
