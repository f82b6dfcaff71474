use std::sync::Arc;

use clap::Args;

use cet_mentor::error::AppError;
use cet_mentor::workflows::admission::{
    AdmissionAlert, AdmissionService, AlertKind, Branch, BranchId, CapRound, Category, College,
    CollegeId, CutoffRecord, PlacementStats, PredictionConfig, Quota, Scholarship, ScoreInput,
    UserId, WILDCARD,
};
use chrono::NaiveDate;

use crate::infra::{parse_category, parse_quota, InMemoryAdmissionsStore, InMemoryUserStore};

/// Cutoff year baked into the demo catalog so CLI runs are reproducible.
pub(crate) const DEMO_DATA_YEAR: i32 = 2024;

/// Session token pre-registered for demos and smoke tests.
pub(crate) const DEMO_SESSION_TOKEN: &str = "demo-session";

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// CET score between 0 and 200
    #[arg(long)]
    pub(crate) score: f64,
    /// Reservation category (OPEN, OBC, SC, ST, EWS)
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Category,
    /// Branch code, or "Any" to search all branches
    #[arg(long, default_value = WILDCARD)]
    pub(crate) branch: String,
    /// Preferred city, or "Any"
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Seat quota (home or outside)
    #[arg(long, value_parser = parse_quota)]
    pub(crate) quota: Option<Quota>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let (service, _, _) = build_demo_service();

    let input = ScoreInput {
        score: args.score,
        category: args.category,
        branch: args.branch,
        location: args.location,
        quota: args.quota,
    };

    let outcome = match service.predict(&input) {
        Ok(outcome) => outcome,
        Err(validation) => {
            eprintln!("invalid input: {validation}");
            return Ok(());
        }
    };

    println!(
        "Estimated rank {} for a score of {} ({})",
        outcome.estimated_rank,
        input.score,
        input.category.label()
    );
    if outcome.results.is_empty() {
        println!("No colleges found in the cutoff window.");
        return Ok(());
    }

    println!("{} colleges in range:", outcome.results.len());
    for result in &outcome.results {
        let fees = result
            .fees_per_year
            .map(|fees| format!("Rs {fees}/yr"))
            .unwrap_or_else(|| "fees n/a".to_string());
        println!(
            "  {:>2}%  {} — {} [{}] cutoff {} ({})",
            result.probability,
            result.name,
            result.branch_name,
            result.city,
            result.cutoff_rank,
            fees
        );
    }

    Ok(())
}

pub(crate) fn build_demo_service() -> (
    Arc<AdmissionService<InMemoryAdmissionsStore, InMemoryUserStore>>,
    Arc<InMemoryAdmissionsStore>,
    Arc<InMemoryUserStore>,
) {
    let catalog = Arc::new(InMemoryAdmissionsStore::default());
    seed_catalog(&catalog);

    let users = Arc::new(InMemoryUserStore::new(catalog.clone()));
    users.register_session(DEMO_SESSION_TOKEN, UserId("user-demo".to_string()));

    let service = Arc::new(AdmissionService::new(
        catalog.clone(),
        users.clone(),
        PredictionConfig {
            data_year: Some(DEMO_DATA_YEAR),
            ..PredictionConfig::default()
        },
    ));
    (service, catalog, users)
}

/// Loads the deterministic sample catalog. Safe to call repeatedly: colleges
/// and branches upsert on their natural keys.
pub(crate) fn seed_catalog(store: &InMemoryAdmissionsStore) {
    let branches: Vec<Branch> = [
        ("CSE", "Computer Science Engineering"),
        ("IT", "Information Technology"),
        ("MECH", "Mechanical Engineering"),
        ("CIVIL", "Civil Engineering"),
        ("E&TC", "Electronics & Telecommunication"),
        ("EE", "Electrical Engineering"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (code, name))| {
        store.upsert_branch(Branch {
            id: BranchId(format!("br-{:02}", index + 1)),
            code: code.to_string(),
            name: name.to_string(),
            discipline: "Engineering".to_string(),
        })
    })
    .collect();

    let colleges: Vec<College> = [
        (
            "College of Engineering, Pune (COEP)",
            "Shivajinagar",
            "Pune",
            "Government",
            "Pune University",
            Some("A++"),
            Some(45),
            Some(85_000),
        ),
        (
            "Veermata Jijabai Technological Institute (VJTI)",
            "Matunga",
            "Mumbai",
            "Government",
            "Mumbai University",
            Some("A++"),
            Some(52),
            Some(90_000),
        ),
        (
            "Walchand College of Engineering, Sangli",
            "Vishrambag",
            "Sangli",
            "Government",
            "Shivaji University",
            Some("A+"),
            Some(125),
            Some(78_000),
        ),
        (
            "Government College of Engineering, Aurangabad",
            "Station Road",
            "Aurangabad",
            "Government",
            "BAMU",
            Some("A"),
            Some(180),
            Some(72_000),
        ),
    ]
    .into_iter()
    .enumerate()
    .map(
        |(index, (name, location, city, college_type, university, naac, nirf, fees))| {
            store.upsert_college(College {
                id: CollegeId(format!("col-{:02}", index + 1)),
                name: name.to_string(),
                location: location.to_string(),
                city: city.to_string(),
                college_type: college_type.to_string(),
                university: university.to_string(),
                naac_rating: naac.map(str::to_string),
                nirf_rank: nirf,
                fees_per_year: fees,
                hostel_available: true,
            })
        },
    )
    .collect();

    let categories = [
        Category::Open,
        Category::Obc,
        Category::Sc,
        Category::St,
        Category::Ews,
    ];
    let quotas = [Quota::HomeUniversity, Quota::OutsideUniversity];

    for (college_index, college) in colleges.iter().enumerate() {
        for (branch_index, branch) in branches.iter().enumerate() {
            for (category_index, category) in categories.iter().enumerate() {
                for (quota_index, quota) in quotas.iter().enumerate() {
                    // Deterministic spread: stronger colleges and hotter
                    // branches close at better ranks; reserved categories
                    // close at higher ranks.
                    let cutoff_rank = 4_000
                        + (college_index as u32) * 9_000
                        + (branch_index as u32) * 1_500
                        + (category_index as u32) * 2_200
                        + (quota_index as u32) * 900;
                    store.insert_cutoff(CutoffRecord {
                        college_id: college.id.clone(),
                        branch_id: branch.id.clone(),
                        category: *category,
                        quota: *quota,
                        round: 1,
                        year: DEMO_DATA_YEAR,
                        cutoff_rank,
                        seats_available: Some(30 + (branch_index as u32) * 6),
                    });
                }
            }

            // Two reporting years so the join has to pick the latest.
            for offset in [1, 0] {
                let year = DEMO_DATA_YEAR - offset;
                store.insert_placement(PlacementStats {
                    college_id: college.id.clone(),
                    branch_id: branch.id.clone(),
                    year,
                    average_package: Some(450_000 + (5 - offset as u32 * 2) * 30_000
                        - (college_index as u32) * 20_000),
                    highest_package: Some(1_600_000 - (college_index as u32) * 100_000),
                    placement_percentage: Some(92 - (college_index as u8) * 4),
                    top_recruiters: vec![
                        "TCS".to_string(),
                        "Infosys".to_string(),
                        "Wipro".to_string(),
                    ],
                });
            }
        }
    }

    let scholarships = [
        (
            "sch-01",
            "Rajarshi Shahu Maharaj Shikshan Shulkh Scholarship",
            vec![Category::Obc, Category::Ews],
            Some(800_000),
            Some(50_000),
        ),
        (
            "sch-02",
            "Post Matric Scholarship",
            vec![Category::Sc, Category::St],
            None,
            Some(75_000),
        ),
        (
            "sch-03",
            "EBC Fee Concession",
            vec![Category::Open, Category::Obc, Category::Ews],
            Some(600_000),
            Some(25_000),
        ),
    ];
    for (id, name, eligibility, income_limit, amount) in scholarships {
        store.insert_scholarship(Scholarship {
            id: id.to_string(),
            name: name.to_string(),
            provider: Some("Government of Maharashtra".to_string()),
            description: None,
            eligibility_categories: eligibility,
            income_limit,
            amount,
            application_link: Some("https://mahadbt.maharashtra.gov.in".to_string()),
            deadline: NaiveDate::from_ymd_opt(DEMO_DATA_YEAR + 1, 8, 31),
        });
    }

    let date = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date");

    let standard_documents = || {
        vec![
            "CET Scorecard".to_string(),
            "10th Marksheet".to_string(),
            "12th Marksheet".to_string(),
            "Domicile Certificate".to_string(),
        ]
    };
    let cap_rounds = [
        (
            DEMO_DATA_YEAR + 1,
            1,
            (7, 1),
            (7, 15),
            "First round of centralized admissions",
        ),
        (
            DEMO_DATA_YEAR + 1,
            2,
            (7, 20),
            (8, 5),
            "Second round for remaining seats",
        ),
        (
            DEMO_DATA_YEAR,
            1,
            (7, 1),
            (7, 15),
            "First round of centralized admissions",
        ),
    ];
    for (year, round_number, (start_m, start_d), (end_m, end_d), description) in cap_rounds {
        store.upsert_cap_round(CapRound {
            id: format!("cap-{year}-{round_number}"),
            year,
            round_number,
            round_name: format!("CAP Round {round_number}"),
            start_date: date(year, start_m, start_d),
            end_date: date(year, end_m, end_d),
            description: Some(description.to_string()),
            required_documents: standard_documents(),
        });
    }

    store.insert_alert(AdmissionAlert {
        id: "alert-cap-1".to_string(),
        title: "CAP Round 1 registration open".to_string(),
        message: "Submit option forms before the round closes.".to_string(),
        alert_type: AlertKind::Urgent,
        start_date: date(DEMO_DATA_YEAR + 1, 1, 1),
        end_date: date(DEMO_DATA_YEAR + 10, 12, 31),
        is_active: true,
    });
    store.insert_alert(AdmissionAlert {
        id: "alert-docs".to_string(),
        title: "Document verification".to_string(),
        message: "Keep caste validity and income certificates ready.".to_string(),
        alert_type: AlertKind::Info,
        start_date: date(DEMO_DATA_YEAR + 1, 1, 1),
        end_date: date(DEMO_DATA_YEAR + 10, 12, 31),
        is_active: true,
    });
}
