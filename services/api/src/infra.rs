use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use cet_mentor::workflows::admission::{
    AdmissionAlert, AdmissionDirectory, AlertKind, Bookmark, BookmarkId, BookmarkView, Branch,
    BranchId, CapRound, Category, College, CollegeId, CutoffMatch, CutoffQuery, CutoffRecord,
    PlacementStats, Quota, RepositoryError, Scholarship, UserId, UserStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct CatalogTables {
    colleges: Vec<College>,
    branches: Vec<Branch>,
    cutoffs: Vec<CutoffRecord>,
    placements: Vec<PlacementStats>,
    scholarships: Vec<Scholarship>,
    alerts: Vec<AdmissionAlert>,
    cap_rounds: Vec<CapRound>,
}

/// In-memory stand-in for the relational catalog. Applies the same
/// predicate/join/sort/limit semantics the workflow expects from the real
/// store, and upsert semantics for seeding.
#[derive(Default)]
pub(crate) struct InMemoryAdmissionsStore {
    tables: Mutex<CatalogTables>,
}

impl InMemoryAdmissionsStore {
    /// Insert-or-replace keyed by college name; a replaced row keeps its id.
    pub(crate) fn upsert_college(&self, mut college: College) -> College {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        if let Some(existing) = tables
            .colleges
            .iter_mut()
            .find(|row| row.name == college.name)
        {
            college.id = existing.id.clone();
            *existing = college.clone();
            return college;
        }
        tables.colleges.push(college.clone());
        college
    }

    /// Insert-or-replace keyed by branch code; a replaced row keeps its id.
    pub(crate) fn upsert_branch(&self, mut branch: Branch) -> Branch {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        if let Some(existing) = tables
            .branches
            .iter_mut()
            .find(|row| row.code == branch.code)
        {
            branch.id = existing.id.clone();
            *existing = branch.clone();
            return branch;
        }
        tables.branches.push(branch.clone());
        branch
    }

    pub(crate) fn insert_cutoff(&self, cutoff: CutoffRecord) {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        tables.cutoffs.push(cutoff);
    }

    pub(crate) fn insert_placement(&self, placement: PlacementStats) {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        tables.placements.push(placement);
    }

    pub(crate) fn insert_scholarship(&self, scholarship: Scholarship) {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        tables.scholarships.push(scholarship);
    }

    pub(crate) fn insert_alert(&self, alert: AdmissionAlert) {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        tables.alerts.push(alert);
    }

    /// Insert-or-replace keyed by (year, round number); a replaced row keeps
    /// its id.
    pub(crate) fn upsert_cap_round(&self, mut round: CapRound) {
        let mut tables = self.tables.lock().expect("catalog mutex poisoned");
        if let Some(existing) = tables
            .cap_rounds
            .iter_mut()
            .find(|row| row.year == round.year && row.round_number == round.round_number)
        {
            round.id = existing.id.clone();
            *existing = round;
            return;
        }
        tables.cap_rounds.push(round);
    }

    fn college_by_id(&self, id: &CollegeId) -> Option<College> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        tables.colleges.iter().find(|row| &row.id == id).cloned()
    }

    fn branch_by_id(&self, id: &BranchId) -> Option<Branch> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        tables.branches.iter().find(|row| &row.id == id).cloned()
    }
}

impl AdmissionDirectory for InMemoryAdmissionsStore {
    fn cutoffs(&self, query: &CutoffQuery) -> Result<Vec<CutoffMatch>, RepositoryError> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");

        let mut matching: Vec<&CutoffRecord> = tables
            .cutoffs
            .iter()
            .filter(|cutoff| cutoff.category == query.category && cutoff.year == query.year)
            .filter(|cutoff| (query.min_rank..=query.max_rank).contains(&cutoff.cutoff_rank))
            .filter(|cutoff| match query.quota {
                Some(quota) => cutoff.quota == quota,
                None => true,
            })
            .collect();
        matching.sort_by_key(|cutoff| cutoff.cutoff_rank);

        let mut rows = Vec::new();
        for cutoff in matching {
            if rows.len() == query.limit {
                break;
            }
            let Some(branch) = tables
                .branches
                .iter()
                .find(|branch| branch.id == cutoff.branch_id)
            else {
                continue;
            };
            if let Some(code) = &query.branch_code {
                if &branch.code != code {
                    continue;
                }
            }
            let Some(college) = tables
                .colleges
                .iter()
                .find(|college| college.id == cutoff.college_id)
            else {
                continue;
            };
            let placement = tables
                .placements
                .iter()
                .filter(|stats| {
                    stats.college_id == cutoff.college_id && stats.branch_id == cutoff.branch_id
                })
                .max_by_key(|stats| stats.year)
                .cloned();
            rows.push(CutoffMatch {
                cutoff: cutoff.clone(),
                college: college.clone(),
                branch: branch.clone(),
                placement,
            });
        }
        Ok(rows)
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        let mut colleges = tables.colleges.clone();
        colleges.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colleges)
    }

    fn branch_by_name(&self, name: &str) -> Result<Option<Branch>, RepositoryError> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        Ok(tables
            .branches
            .iter()
            .find(|branch| branch.name == name)
            .cloned())
    }

    fn active_alerts(&self, today: NaiveDate) -> Result<Vec<AdmissionAlert>, RepositoryError> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        // Newest first; insertion order stands in for created_at.
        Ok(tables
            .alerts
            .iter()
            .rev()
            .filter(|alert| alert.is_live(today))
            .cloned()
            .collect())
    }

    fn scholarships_for(&self, category: Category) -> Result<Vec<Scholarship>, RepositoryError> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        let mut matches: Vec<Scholarship> = tables
            .scholarships
            .iter()
            .filter(|scholarship| scholarship.eligibility_categories.contains(&category))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(matches)
    }

    fn cap_rounds(&self) -> Result<Vec<CapRound>, RepositoryError> {
        let tables = self.tables.lock().expect("catalog mutex poisoned");
        let mut rounds = tables.cap_rounds.clone();
        rounds.sort_by(|a, b| b.year.cmp(&a.year).then(a.round_number.cmp(&b.round_number)));
        Ok(rounds)
    }
}

/// In-memory session and bookmark store. Joins bookmark views against the
/// shared catalog.
pub(crate) struct InMemoryUserStore {
    catalog: Arc<InMemoryAdmissionsStore>,
    sessions: Mutex<HashMap<String, UserId>>,
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl InMemoryUserStore {
    pub(crate) fn new(catalog: Arc<InMemoryAdmissionsStore>) -> Self {
        Self {
            catalog,
            sessions: Mutex::new(HashMap::new()),
            bookmarks: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn register_session(&self, token: &str, user: UserId) {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.insert(token.to_string(), user);
    }
}

impl UserStore for InMemoryUserStore {
    fn authenticate(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let sessions = self.sessions.lock().expect("session mutex poisoned");
        Ok(sessions.get(token).cloned())
    }

    fn insert_bookmark(&self, bookmark: Bookmark) -> Result<Bookmark, RepositoryError> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark mutex poisoned");
        let duplicate = bookmarks.iter().any(|existing| {
            existing.user_id == bookmark.user_id
                && existing.college_id == bookmark.college_id
                && existing.branch_id == bookmark.branch_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    fn bookmarks_for(&self, user: &UserId) -> Result<Vec<BookmarkView>, RepositoryError> {
        let bookmarks = self.bookmarks.lock().expect("bookmark mutex poisoned");
        Ok(bookmarks
            .iter()
            .filter(|bookmark| &bookmark.user_id == user)
            .filter_map(|bookmark| {
                let college = self.catalog.college_by_id(&bookmark.college_id)?;
                let branch = self.catalog.branch_by_id(&bookmark.branch_id)?;
                Some(BookmarkView {
                    id: bookmark.id.clone(),
                    college,
                    branch,
                    notes: bookmark.notes.clone(),
                })
            })
            .collect())
    }

    fn delete_bookmark(&self, user: &UserId, id: &BookmarkId) -> Result<(), RepositoryError> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark mutex poisoned");
        let before = bookmarks.len();
        bookmarks.retain(|bookmark| !(bookmark.id == *id && bookmark.user_id == *user));
        if bookmarks.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, String> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "OPEN" => Ok(Category::Open),
        "OBC" => Ok(Category::Obc),
        "SC" => Ok(Category::Sc),
        "ST" => Ok(Category::St),
        "EWS" => Ok(Category::Ews),
        other => Err(format!(
            "unknown category '{other}' (expected OPEN, OBC, SC, ST, or EWS)"
        )),
    }
}

pub(crate) fn parse_quota(raw: &str) -> Result<Quota, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "home" | "home university" => Ok(Quota::HomeUniversity),
        "outside" | "outside university" => Ok(Quota::OutsideUniversity),
        other => Err(format!("unknown quota '{other}' (expected home or outside)")),
    }
}
