//! Admission prediction workflow: score-to-rank estimation, probability
//! banding, shortlist assembly, and the bookmark/alert/scholarship paths
//! around them.

pub mod domain;
pub mod prediction;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdmissionAlert, AlertKind, Bookmark, BookmarkId, Branch, BranchId, CapRound, Category,
    College, CollegeId, CollegeResult, CutoffMatch, CutoffRecord, PlacementStats, Quota,
    Scholarship, ScoreInput, UserId, WILDCARD,
};
pub use prediction::{
    admission_probability, estimated_rank, PredictionConfig, PredictionEngine, PredictionOutcome,
};
pub use repository::{
    AdmissionDirectory, BookmarkView, CutoffQuery, RepositoryError, UserStore,
};
pub use router::admission_router;
pub use service::{
    AdmissionService, BookmarkError, BookmarkOutcome, ValidationError,
};
