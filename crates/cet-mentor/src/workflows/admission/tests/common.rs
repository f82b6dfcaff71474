use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::admission::domain::{
    AdmissionAlert, AlertKind, Bookmark, BookmarkId, Branch, BranchId, CapRound, Category,
    College, CollegeId, CutoffMatch, CutoffRecord, PlacementStats, Quota, Scholarship, ScoreInput,
};
use crate::workflows::admission::repository::{
    AdmissionDirectory, BookmarkView, CutoffQuery, RepositoryError, UserStore,
};
use crate::workflows::admission::{
    admission_router, AdmissionService, PredictionConfig,
};

pub(super) const DATA_YEAR: i32 = 2024;
pub(super) const SESSION_TOKEN: &str = "session-abc";

pub(super) fn prediction_config() -> PredictionConfig {
    PredictionConfig {
        data_year: Some(DATA_YEAR),
        ..PredictionConfig::default()
    }
}

pub(super) fn score_input() -> ScoreInput {
    ScoreInput {
        score: 150.0,
        category: Category::Open,
        branch: "Any".to_string(),
        location: None,
        quota: None,
    }
}

pub(super) fn coep() -> College {
    College {
        id: CollegeId("col-coep".to_string()),
        name: "College of Engineering, Pune (COEP)".to_string(),
        location: "Shivajinagar".to_string(),
        city: "Pune".to_string(),
        college_type: "Government".to_string(),
        university: "Pune University".to_string(),
        naac_rating: Some("A++".to_string()),
        nirf_rank: Some(45),
        fees_per_year: Some(85_000),
        hostel_available: true,
    }
}

pub(super) fn vjti() -> College {
    College {
        id: CollegeId("col-vjti".to_string()),
        name: "Veermata Jijabai Technological Institute (VJTI)".to_string(),
        location: "Matunga".to_string(),
        city: "Mumbai".to_string(),
        college_type: "Government".to_string(),
        university: "Mumbai University".to_string(),
        naac_rating: Some("A++".to_string()),
        nirf_rank: Some(52),
        fees_per_year: Some(90_000),
        hostel_available: true,
    }
}

pub(super) fn branch_cse() -> Branch {
    Branch {
        id: BranchId("br-cse".to_string()),
        code: "CSE".to_string(),
        name: "Computer Science Engineering".to_string(),
        discipline: "Engineering".to_string(),
    }
}

pub(super) fn branch_mech() -> Branch {
    Branch {
        id: BranchId("br-mech".to_string()),
        code: "MECH".to_string(),
        name: "Mechanical Engineering".to_string(),
        discipline: "Engineering".to_string(),
    }
}

pub(super) fn cutoff_match(college: College, branch: Branch, cutoff_rank: u32) -> CutoffMatch {
    let cutoff = CutoffRecord {
        college_id: college.id.clone(),
        branch_id: branch.id.clone(),
        category: Category::Open,
        quota: Quota::HomeUniversity,
        round: 1,
        year: DATA_YEAR,
        cutoff_rank,
        seats_available: Some(60),
    };
    CutoffMatch {
        cutoff,
        college,
        branch,
        placement: None,
    }
}

pub(super) fn with_placement(mut row: CutoffMatch, average_package: u32) -> CutoffMatch {
    row.placement = Some(PlacementStats {
        college_id: row.college.id.clone(),
        branch_id: row.branch.id.clone(),
        year: DATA_YEAR,
        average_package: Some(average_package),
        highest_package: Some(average_package * 3),
        placement_percentage: Some(88),
        top_recruiters: vec!["TCS".to_string(), "Infosys".to_string()],
    });
    row
}

pub(super) fn scholarship(id: &str, categories: Vec<Category>, amount: u32) -> Scholarship {
    Scholarship {
        id: id.to_string(),
        name: format!("Scholarship {id}"),
        provider: Some("State of Maharashtra".to_string()),
        description: None,
        eligibility_categories: categories,
        income_limit: Some(800_000),
        amount: Some(amount),
        application_link: None,
        deadline: None,
    }
}

pub(super) fn cap_round(year: i32, round_number: u8) -> CapRound {
    CapRound {
        id: format!("cap-{year}-{round_number}"),
        year,
        round_number,
        round_name: format!("CAP Round {round_number}"),
        start_date: NaiveDate::from_ymd_opt(year, 7, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(year, 7, 15).expect("valid date"),
        description: None,
        required_documents: vec!["CET Scorecard".to_string(), "Domicile Certificate".to_string()],
    }
}

pub(super) fn live_alert(id: &str) -> AdmissionAlert {
    AdmissionAlert {
        id: id.to_string(),
        title: "CAP Round 1 open".to_string(),
        message: "Option form submission closes soon".to_string(),
        alert_type: AlertKind::Urgent,
        start_date: NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2100, 1, 1).expect("valid date"),
        is_active: true,
    }
}

/// Directory fake applying the same predicate/sort/limit semantics the
/// production stores implement.
#[derive(Default)]
pub(super) struct MemoryDirectory {
    pub(super) rows: Vec<CutoffMatch>,
    pub(super) branches: Vec<Branch>,
    pub(super) catalog: Vec<College>,
    pub(super) alerts: Vec<AdmissionAlert>,
    pub(super) scholarships: Vec<Scholarship>,
    pub(super) cap_rounds: Vec<CapRound>,
    pub(super) queries: AtomicUsize,
}

impl MemoryDirectory {
    pub(super) fn with_rows(rows: Vec<CutoffMatch>) -> Self {
        Self {
            rows,
            branches: vec![branch_cse(), branch_mech()],
            catalog: vec![coep(), vjti()],
            ..Self::default()
        }
    }

    pub(super) fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl AdmissionDirectory for MemoryDirectory {
    fn cutoffs(&self, query: &CutoffQuery) -> Result<Vec<CutoffMatch>, RepositoryError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<CutoffMatch> = self
            .rows
            .iter()
            .filter(|row| row.cutoff.category == query.category)
            .filter(|row| row.cutoff.year == query.year)
            .filter(|row| {
                (query.min_rank..=query.max_rank).contains(&row.cutoff.cutoff_rank)
            })
            .filter(|row| match &query.branch_code {
                Some(code) => &row.branch.code == code,
                None => true,
            })
            .filter(|row| match query.quota {
                Some(quota) => row.cutoff.quota == quota,
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.cutoff.cutoff_rank);
        rows.truncate(query.limit);
        Ok(rows)
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        let mut colleges = self.catalog.clone();
        colleges.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colleges)
    }

    fn branch_by_name(&self, name: &str) -> Result<Option<Branch>, RepositoryError> {
        Ok(self.branches.iter().find(|branch| branch.name == name).cloned())
    }

    fn active_alerts(&self, today: NaiveDate) -> Result<Vec<AdmissionAlert>, RepositoryError> {
        let mut alerts: Vec<AdmissionAlert> = self
            .alerts
            .iter()
            .filter(|alert| alert.is_live(today))
            .cloned()
            .collect();
        alerts.reverse();
        Ok(alerts)
    }

    fn scholarships_for(&self, category: Category) -> Result<Vec<Scholarship>, RepositoryError> {
        let mut matches: Vec<Scholarship> = self
            .scholarships
            .iter()
            .filter(|scholarship| scholarship.eligibility_categories.contains(&category))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(matches)
    }

    fn cap_rounds(&self) -> Result<Vec<CapRound>, RepositoryError> {
        let mut rounds = self.cap_rounds.clone();
        rounds.sort_by(|a, b| b.year.cmp(&a.year).then(a.round_number.cmp(&b.round_number)));
        Ok(rounds)
    }
}

/// Directory fake that fails every call, for degrade-gracefully tests.
pub(super) struct UnavailableDirectory;

impl AdmissionDirectory for UnavailableDirectory {
    fn cutoffs(&self, _query: &CutoffQuery) -> Result<Vec<CutoffMatch>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn colleges(&self) -> Result<Vec<College>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn branch_by_name(&self, _name: &str) -> Result<Option<Branch>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_alerts(&self, _today: NaiveDate) -> Result<Vec<AdmissionAlert>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn scholarships_for(&self, _category: Category) -> Result<Vec<Scholarship>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn cap_rounds(&self) -> Result<Vec<CapRound>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// User store fake with one known session and in-memory bookmarks enforcing
/// the (user, college, branch) uniqueness invariant.
#[derive(Default)]
pub(super) struct MemoryUsers {
    pub(super) sessions: HashMap<String, crate::workflows::admission::UserId>,
    pub(super) bookmarks: Mutex<Vec<Bookmark>>,
}

impl MemoryUsers {
    pub(super) fn with_session() -> Self {
        let mut sessions = HashMap::new();
        sessions.insert(
            SESSION_TOKEN.to_string(),
            crate::workflows::admission::UserId("user-1".to_string()),
        );
        Self {
            sessions,
            bookmarks: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn bookmark_count(&self) -> usize {
        self.bookmarks.lock().expect("bookmark mutex poisoned").len()
    }
}

impl UserStore for MemoryUsers {
    fn authenticate(
        &self,
        token: &str,
    ) -> Result<Option<crate::workflows::admission::UserId>, RepositoryError> {
        Ok(self.sessions.get(token).cloned())
    }

    fn insert_bookmark(&self, bookmark: Bookmark) -> Result<Bookmark, RepositoryError> {
        let mut guard = self.bookmarks.lock().expect("bookmark mutex poisoned");
        let duplicate = guard.iter().any(|existing| {
            existing.user_id == bookmark.user_id
                && existing.college_id == bookmark.college_id
                && existing.branch_id == bookmark.branch_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.push(bookmark.clone());
        Ok(bookmark)
    }

    fn bookmarks_for(
        &self,
        user: &crate::workflows::admission::UserId,
    ) -> Result<Vec<BookmarkView>, RepositoryError> {
        let guard = self.bookmarks.lock().expect("bookmark mutex poisoned");
        let catalog = vec![coep(), vjti()];
        let branches = vec![branch_cse(), branch_mech()];
        Ok(guard
            .iter()
            .filter(|bookmark| &bookmark.user_id == user)
            .filter_map(|bookmark| {
                let college = catalog.iter().find(|c| c.id == bookmark.college_id)?;
                let branch = branches.iter().find(|b| b.id == bookmark.branch_id)?;
                Some(BookmarkView {
                    id: bookmark.id.clone(),
                    college: college.clone(),
                    branch: branch.clone(),
                    notes: bookmark.notes.clone(),
                })
            })
            .collect())
    }

    fn delete_bookmark(
        &self,
        user: &crate::workflows::admission::UserId,
        id: &BookmarkId,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.bookmarks.lock().expect("bookmark mutex poisoned");
        let before = guard.len();
        guard.retain(|bookmark| !(bookmark.id == *id && bookmark.user_id == *user));
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub(super) fn build_service(
    rows: Vec<CutoffMatch>,
) -> (
    Arc<AdmissionService<MemoryDirectory, MemoryUsers>>,
    Arc<MemoryDirectory>,
    Arc<MemoryUsers>,
) {
    let directory = Arc::new(MemoryDirectory::with_rows(rows));
    let users = Arc::new(MemoryUsers::with_session());
    let service = Arc::new(AdmissionService::new(
        directory.clone(),
        users.clone(),
        prediction_config(),
    ));
    (service, directory, users)
}

pub(super) fn admission_router_with_rows(rows: Vec<CutoffMatch>) -> axum::Router {
    let (service, _, _) = build_service(rows);
    admission_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
