use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::domain::{BookmarkId, Category, CollegeId, ScoreInput};
use super::repository::{AdmissionDirectory, RepositoryError, UserStore};
use super::service::{AdmissionService, BookmarkError, BookmarkOutcome};

/// Router builder exposing HTTP endpoints for prediction, catalog reads, and
/// bookmarks.
pub fn admission_router<D, U>(service: Arc<AdmissionService<D, U>>) -> Router
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    Router::new()
        .route("/api/v1/admission/predictions", post(predict_handler::<D, U>))
        .route("/api/v1/admission/colleges", get(colleges_handler::<D, U>))
        .route("/api/v1/admission/alerts", get(alerts_handler::<D, U>))
        .route(
            "/api/v1/admission/cap-rounds",
            get(cap_rounds_handler::<D, U>),
        )
        .route(
            "/api/v1/admission/scholarships",
            get(scholarships_handler::<D, U>),
        )
        .route(
            "/api/v1/admission/bookmarks",
            post(save_bookmark_handler::<D, U>).get(list_bookmarks_handler::<D, U>),
        )
        .route(
            "/api/v1/admission/bookmarks/:bookmark_id",
            axum::routing::delete(delete_bookmark_handler::<D, U>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveBookmarkRequest {
    pub(crate) college_id: String,
    pub(crate) branch_name: String,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScholarshipParams {
    pub(crate) category: Category,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Unauthenticated callers are pointed at the sign-in page instead of being
/// failed silently.
fn sign_in_response() -> Response {
    let payload = json!({
        "error": "sign in required",
        "redirect": "/auth",
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn store_error_response(err: &RepositoryError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

fn unknown_branch_response(name: &str) -> Response {
    let payload = json!({ "error": format!("no branch named '{name}'") });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

pub(crate) async fn predict_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
    axum::Json(input): axum::Json<ScoreInput>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    match service.predict(&input) {
        Ok(outcome) => {
            let payload = json!({
                "estimated_rank": outcome.estimated_rank,
                "count": outcome.results.len(),
                "results": outcome.results,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(validation) => {
            let payload = json!({ "error": validation.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn colleges_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    match service.colleges() {
        Ok(colleges) => (StatusCode::OK, axum::Json(colleges)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub(crate) async fn alerts_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    let today = Local::now().date_naive();
    match service.active_alerts(today) {
        Ok(alerts) => (StatusCode::OK, axum::Json(alerts)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub(crate) async fn cap_rounds_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    match service.cap_rounds() {
        Ok(rounds) => (StatusCode::OK, axum::Json(rounds)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub(crate) async fn scholarships_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
    Query(params): Query<ScholarshipParams>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    match service.scholarships(params.category) {
        Ok(scholarships) => (StatusCode::OK, axum::Json(scholarships)).into_response(),
        Err(err) => store_error_response(&err),
    }
}

pub(crate) async fn save_bookmark_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SaveBookmarkRequest>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return sign_in_response();
    };

    let college_id = CollegeId(request.college_id);
    match service.save_bookmark(token, &college_id, &request.branch_name, request.notes) {
        Ok(BookmarkOutcome::Created(bookmark)) => {
            let payload = json!({
                "status": "created",
                "bookmark_id": bookmark.id,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Ok(BookmarkOutcome::AlreadyExists) => {
            let payload = json!({
                "status": "already_exists",
                "message": "this college is already in your bookmarks",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(BookmarkError::Unauthenticated) => sign_in_response(),
        Err(BookmarkError::UnknownBranch(name)) => unknown_branch_response(&name),
        Err(BookmarkError::Store(err)) => store_error_response(&err),
    }
}

pub(crate) async fn list_bookmarks_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
    headers: HeaderMap,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return sign_in_response();
    };

    match service.bookmarks(token) {
        Ok(bookmarks) => (StatusCode::OK, axum::Json(bookmarks)).into_response(),
        Err(BookmarkError::Unauthenticated) => sign_in_response(),
        Err(BookmarkError::UnknownBranch(name)) => unknown_branch_response(&name),
        Err(BookmarkError::Store(err)) => store_error_response(&err),
    }
}

pub(crate) async fn delete_bookmark_handler<D, U>(
    State(service): State<Arc<AdmissionService<D, U>>>,
    headers: HeaderMap,
    Path(bookmark_id): Path<String>,
) -> Response
where
    D: AdmissionDirectory + 'static,
    U: UserStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return sign_in_response();
    };

    match service.remove_bookmark(token, &BookmarkId(bookmark_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(BookmarkError::Unauthenticated) => sign_in_response(),
        Err(BookmarkError::UnknownBranch(name)) => unknown_branch_response(&name),
        Err(BookmarkError::Store(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "bookmark not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(BookmarkError::Store(err)) => store_error_response(&err),
    }
}
