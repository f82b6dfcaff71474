use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Tunables for the shortlist query around an estimated rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// How far below the estimate the cutoff window reaches.
    pub rank_window_below: u32,
    /// How far above the estimate the cutoff window reaches.
    pub rank_window_above: u32,
    /// Cap on the number of cutoff rows fetched per prediction.
    pub result_limit: usize,
    /// Pinned cutoff data year; `None` means the previous calendar year.
    pub data_year: Option<i32>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            rank_window_below: 5_000,
            rank_window_above: 10_000,
            result_limit: 50,
            data_year: None,
        }
    }
}

impl PredictionConfig {
    /// Cutoff tables lag a cycle behind, so predictions read last year's
    /// rounds unless a year is pinned.
    pub fn year_for(&self, today: NaiveDate) -> i32 {
        self.data_year.unwrap_or_else(|| today.year() - 1)
    }
}
