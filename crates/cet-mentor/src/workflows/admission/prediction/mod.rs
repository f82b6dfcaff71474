mod config;
mod model;

pub use config::PredictionConfig;
pub use model::{admission_probability, estimated_rank};

use super::domain::{CollegeResult, CutoffMatch, ScoreInput};
use serde::{Deserialize, Serialize};

/// Inclusive cutoff-rank window queried around an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankWindow {
    pub lower: u32,
    pub upper: u32,
}

/// Everything a prediction call returns to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub estimated_rank: u32,
    pub results: Vec<CollegeResult>,
}

/// Stateless assembler turning joined cutoff rows into a shortlist.
pub struct PredictionEngine {
    config: PredictionConfig,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn window(&self, estimated_rank: u32) -> RankWindow {
        RankWindow {
            lower: estimated_rank
                .saturating_sub(self.config.rank_window_below)
                .max(1),
            upper: estimated_rank.saturating_add(self.config.rank_window_above),
        }
    }

    /// Builds the shortlist from rows already ordered by ascending cutoff
    /// rank. The order is inherited, never re-sorted by probability. The
    /// city filter runs after the join so it never widens the rank window.
    pub fn shortlist(
        &self,
        input: &ScoreInput,
        estimated_rank: u32,
        matches: Vec<CutoffMatch>,
    ) -> Vec<CollegeResult> {
        matches
            .into_iter()
            .filter(|row| match input.location_filter() {
                Some(city) => row.college.city == city,
                None => true,
            })
            .map(|row| assemble_result(estimated_rank, row))
            .collect()
    }
}

fn assemble_result(estimated_rank: u32, row: CutoffMatch) -> CollegeResult {
    let CutoffMatch {
        cutoff,
        college,
        branch,
        placement,
    } = row;

    let probability = admission_probability(estimated_rank, cutoff.cutoff_rank);

    CollegeResult {
        id: college.id,
        name: college.name,
        location: college.location,
        city: college.city,
        college_type: college.college_type,
        naac_rating: college.naac_rating,
        nirf_rank: college.nirf_rank,
        fees_per_year: college.fees_per_year,
        branch_name: branch.name,
        cutoff_rank: cutoff.cutoff_rank,
        probability,
        seats_available: cutoff.seats_available,
        average_package: placement.as_ref().and_then(|stats| stats.average_package),
        highest_package: placement.as_ref().and_then(|stats| stats.highest_package),
        placement_percentage: placement
            .as_ref()
            .and_then(|stats| stats.placement_percentage),
    }
}
