use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    AdmissionAlert, Bookmark, BookmarkId, Branch, CapRound, Category, College, CutoffMatch, Quota,
    Scholarship, UserId,
};

/// Predicate set for one cutoff lookup. The store applies every filter,
/// sorts ascending by cutoff rank, and caps the row count; callers inherit
/// that order untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffQuery {
    pub category: Category,
    pub year: i32,
    pub min_rank: u32,
    pub max_rank: u32,
    pub branch_code: Option<String>,
    pub quota: Option<Quota>,
    pub limit: usize,
}

/// Read-only catalog of colleges, branches, cutoffs, and related records.
pub trait AdmissionDirectory: Send + Sync {
    /// Joined cutoff rows matching the query, rank-ascending, capped at
    /// `query.limit`.
    fn cutoffs(&self, query: &CutoffQuery) -> Result<Vec<CutoffMatch>, RepositoryError>;

    /// Every college in the catalog, ordered by name.
    fn colleges(&self) -> Result<Vec<College>, RepositoryError>;

    /// Branch lookup by display name, used when saving bookmarks.
    fn branch_by_name(&self, name: &str) -> Result<Option<Branch>, RepositoryError>;

    /// Alerts that are flagged active and whose window contains `today`,
    /// newest first.
    fn active_alerts(&self, today: NaiveDate) -> Result<Vec<AdmissionAlert>, RepositoryError>;

    /// Scholarships whose eligibility list contains the category, largest
    /// amount first.
    fn scholarships_for(&self, category: Category) -> Result<Vec<Scholarship>, RepositoryError>;

    /// Every CAP round on record, newest year first, rounds ascending within
    /// a year.
    fn cap_rounds(&self) -> Result<Vec<CapRound>, RepositoryError>;
}

/// Session identity plus bookmark persistence for authenticated students.
pub trait UserStore: Send + Sync {
    /// Resolves a bearer token to a user, `None` when the session is unknown
    /// or expired.
    fn authenticate(&self, token: &str) -> Result<Option<UserId>, RepositoryError>;

    /// Inserts a bookmark. The store owns the (user, college, branch)
    /// uniqueness invariant and answers duplicates with
    /// [`RepositoryError::Conflict`].
    fn insert_bookmark(&self, bookmark: Bookmark) -> Result<Bookmark, RepositoryError>;

    fn bookmarks_for(&self, user: &UserId) -> Result<Vec<BookmarkView>, RepositoryError>;

    fn delete_bookmark(&self, user: &UserId, id: &BookmarkId) -> Result<(), RepositoryError>;
}

/// Error enumeration for store failures. Conflicts are a tagged variant so
/// callers never have to inspect error strings.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Bookmark joined with its college and branch for listing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkView {
    pub id: BookmarkId,
    pub college: College,
    pub branch: Branch,
    pub notes: Option<String>,
}
