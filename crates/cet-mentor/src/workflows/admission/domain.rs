use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire value students pick when they do not want to narrow a filter.
pub const WILDCARD: &str = "Any";

/// Identifier wrapper for colleges in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollegeId(pub String);

/// Identifier wrapper for engineering branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(pub String);

/// Identifier wrapper for authenticated students.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for saved bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkId(pub String);

/// Reservation categories recognized by the centralized admission process.
/// Each category carries its own cutoff table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Open,
    Obc,
    Sc,
    St,
    Ews,
}

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Category::Open => "OPEN",
            Category::Obc => "OBC",
            Category::Sc => "SC",
            Category::St => "ST",
            Category::Ews => "EWS",
        }
    }
}

/// Seat allocation pool a cutoff applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quota {
    #[serde(rename = "Home University")]
    HomeUniversity,
    #[serde(rename = "Outside University")]
    OutsideUniversity,
}

impl Quota {
    pub const fn label(self) -> &'static str {
        match self {
            Quota::HomeUniversity => "Home University",
            Quota::OutsideUniversity => "Outside University",
        }
    }
}

/// One prediction request as submitted by a student. Lives only for the
/// duration of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    /// Raw CET score, validated to lie in [0, 200].
    pub score: f64,
    pub category: Category,
    /// Branch code, or [`WILDCARD`] to search across branches.
    pub branch: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub quota: Option<Quota>,
}

impl ScoreInput {
    /// Branch code to filter on, with the wildcard collapsed to `None`.
    pub fn branch_filter(&self) -> Option<&str> {
        let code = self.branch.trim();
        if code.is_empty() || code == WILDCARD {
            None
        } else {
            Some(code)
        }
    }

    /// City to filter on after the join, with the wildcard collapsed to `None`.
    pub fn location_filter(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty() && *city != WILDCARD)
    }
}

/// Catalog entry for a college.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    pub id: CollegeId,
    pub name: String,
    pub location: String,
    pub city: String,
    pub college_type: String,
    pub university: String,
    pub naac_rating: Option<String>,
    pub nirf_rank: Option<u32>,
    pub fees_per_year: Option<u32>,
    pub hostel_available: bool,
}

/// Catalog entry for an engineering branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub code: String,
    pub name: String,
    pub discipline: String,
}

/// Historical cutoff fact for one college/branch/category/quota/round.
/// Owned by the data store; the workflow only reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoffRecord {
    pub college_id: CollegeId,
    pub branch_id: BranchId,
    pub category: Category,
    pub quota: Quota,
    pub round: u8,
    pub year: i32,
    pub cutoff_rank: u32,
    pub seats_available: Option<u32>,
}

/// Placement statistics reported for a college/branch in a given year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStats {
    pub college_id: CollegeId,
    pub branch_id: BranchId,
    pub year: i32,
    pub average_package: Option<u32>,
    pub highest_package: Option<u32>,
    pub placement_percentage: Option<u8>,
    pub top_recruiters: Vec<String>,
}

/// Pre-joined row handed back by the cutoff query: the cutoff fact plus its
/// college, branch, and most recent placement report when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffMatch {
    pub cutoff: CutoffRecord,
    pub college: College,
    pub branch: Branch,
    pub placement: Option<PlacementStats>,
}

/// Shortlist entry assembled per prediction call. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeResult {
    pub id: CollegeId,
    pub name: String,
    pub location: String,
    pub city: String,
    pub college_type: String,
    pub naac_rating: Option<String>,
    pub nirf_rank: Option<u32>,
    pub fees_per_year: Option<u32>,
    pub branch_name: String,
    pub cutoff_rank: u32,
    /// Admission likelihood, always clamped to [1, 99].
    pub probability: u8,
    pub seats_available: Option<u32>,
    pub average_package: Option<u32>,
    pub highest_package: Option<u32>,
    pub placement_percentage: Option<u8>,
}

/// A saved college/branch pair. At most one per (user, college, branch);
/// the store enforces the invariant and signals violations as conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: UserId,
    pub college_id: CollegeId,
    pub branch_id: BranchId,
    pub notes: Option<String>,
}

/// Severity of a broadcast admission alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Urgent,
}

/// Time-boxed announcement about the admission process (round openings,
/// document deadlines, and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionAlert {
    pub id: String,
    pub title: String,
    pub message: String,
    pub alert_type: AlertKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

impl AdmissionAlert {
    /// An alert is shown while its flag is set and today falls in its window.
    pub fn is_live(&self, today: NaiveDate) -> bool {
        self.is_active && self.start_date <= today && today <= self.end_date
    }
}

/// One round of the Centralized Admission Process. Rounds are keyed by
/// (year, round number); the counseling guide lists them newest year first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapRound {
    pub id: String,
    pub year: i32,
    pub round_number: u8,
    pub round_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    pub required_documents: Vec<String>,
}

/// Scholarship a student may be eligible for based on reservation category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: String,
    pub name: String,
    pub provider: Option<String>,
    pub description: Option<String>,
    pub eligibility_categories: Vec<Category>,
    pub income_limit: Option<u32>,
    pub amount: Option<u32>,
    pub application_link: Option<String>,
    pub deadline: Option<NaiveDate>,
}
