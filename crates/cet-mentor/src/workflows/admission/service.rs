use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::error;

use super::domain::{
    AdmissionAlert, Bookmark, BookmarkId, CapRound, Category, College, CollegeId, Scholarship,
    ScoreInput,
};
use super::prediction::{estimated_rank, PredictionConfig, PredictionEngine, PredictionOutcome};
use super::repository::{
    AdmissionDirectory, BookmarkView, CutoffQuery, RepositoryError, UserStore,
};

/// Service composing the prediction engine, catalog directory, and user store.
/// Stateless between calls; every request stands alone.
pub struct AdmissionService<D, U> {
    directory: Arc<D>,
    users: Arc<U>,
    engine: PredictionEngine,
}

static BOOKMARK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_bookmark_id() -> BookmarkId {
    let id = BOOKMARK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BookmarkId(format!("bm-{id:06}"))
}

impl<D, U> AdmissionService<D, U>
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    pub fn new(directory: Arc<D>, users: Arc<U>, config: PredictionConfig) -> Self {
        Self {
            directory,
            users,
            engine: PredictionEngine::new(config),
        }
    }

    /// Runs one prediction: validate, estimate the rank, query the cutoff
    /// window, and assemble the shortlist.
    ///
    /// A store failure degrades to an empty shortlist with a logged
    /// diagnostic; the action is user-retriable so there is no retry here.
    pub fn predict(&self, input: &ScoreInput) -> Result<PredictionOutcome, ValidationError> {
        validate(input)?;

        let estimated = estimated_rank(input.score);
        let window = self.engine.window(estimated);
        let query = CutoffQuery {
            category: input.category,
            year: self.engine.config().year_for(Local::now().date_naive()),
            min_rank: window.lower,
            max_rank: window.upper,
            branch_code: input.branch_filter().map(str::to_string),
            quota: input.quota,
            limit: self.engine.config().result_limit,
        };

        let matches = match self.directory.cutoffs(&query) {
            Ok(rows) => rows,
            Err(err) => {
                error!(%err, estimated_rank = estimated, "cutoff query failed, returning empty shortlist");
                return Ok(PredictionOutcome {
                    estimated_rank: estimated,
                    results: Vec::new(),
                });
            }
        };

        Ok(PredictionOutcome {
            estimated_rank: estimated,
            results: self.engine.shortlist(input, estimated, matches),
        })
    }

    /// Saves a college/branch pair for the signed-in student. A duplicate is
    /// an informational outcome, not an error.
    pub fn save_bookmark(
        &self,
        token: &str,
        college_id: &CollegeId,
        branch_name: &str,
        notes: Option<String>,
    ) -> Result<BookmarkOutcome, BookmarkError> {
        let user = self
            .users
            .authenticate(token)?
            .ok_or(BookmarkError::Unauthenticated)?;

        let branch = self
            .directory
            .branch_by_name(branch_name)?
            .ok_or_else(|| BookmarkError::UnknownBranch(branch_name.to_string()))?;

        let bookmark = Bookmark {
            id: next_bookmark_id(),
            user_id: user,
            college_id: college_id.clone(),
            branch_id: branch.id,
            notes,
        };

        match self.users.insert_bookmark(bookmark) {
            Ok(stored) => Ok(BookmarkOutcome::Created(stored)),
            Err(RepositoryError::Conflict) => Ok(BookmarkOutcome::AlreadyExists),
            Err(other) => Err(BookmarkError::Store(other)),
        }
    }

    pub fn bookmarks(&self, token: &str) -> Result<Vec<BookmarkView>, BookmarkError> {
        let user = self
            .users
            .authenticate(token)?
            .ok_or(BookmarkError::Unauthenticated)?;
        Ok(self.users.bookmarks_for(&user)?)
    }

    pub fn remove_bookmark(&self, token: &str, id: &BookmarkId) -> Result<(), BookmarkError> {
        let user = self
            .users
            .authenticate(token)?
            .ok_or(BookmarkError::Unauthenticated)?;
        Ok(self.users.delete_bookmark(&user, id)?)
    }

    pub fn active_alerts(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<AdmissionAlert>, RepositoryError> {
        self.directory.active_alerts(today)
    }

    pub fn scholarships(&self, category: Category) -> Result<Vec<Scholarship>, RepositoryError> {
        self.directory.scholarships_for(category)
    }

    pub fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        self.directory.colleges()
    }

    pub fn cap_rounds(&self) -> Result<Vec<CapRound>, RepositoryError> {
        self.directory.cap_rounds()
    }
}

fn validate(input: &ScoreInput) -> Result<(), ValidationError> {
    if !input.score.is_finite() || input.score < 0.0 || input.score > 200.0 {
        return Err(ValidationError::ScoreOutOfRange(input.score));
    }
    if input.branch.trim().is_empty() {
        return Err(ValidationError::MissingBranch);
    }
    Ok(())
}

/// Input problems rejected before any query is issued.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("score {0} must lie between 0 and 200")]
    ScoreOutOfRange(f64),
    #[error("a branch selection is required (use \"Any\" to search all branches)")]
    MissingBranch,
}

/// Result of a bookmark save; duplicates are first-class, not failures.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkOutcome {
    Created(Bookmark),
    AlreadyExists,
}

/// Error raised by the bookmark paths.
#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    #[error("sign in required")]
    Unauthenticated,
    #[error("no branch named '{0}' in the catalog")]
    UnknownBranch(String),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}
