use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::directory::ResidentDirectory;
use super::domain::{DocumentRequestSubmission, DocumentType, Priority, RequestId, RequestStatus};
use super::lifecycle::{LifecycleError, RequestLifecycleService};
use super::store::{PageRequest, RequestFilter, RequestStore};
use super::tracking::TrackingError;

/// Router exposing the document request engine to the portal's API layer.
pub fn request_router<S, D>(service: Arc<RequestLifecycleService<S, D>>) -> Router
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/requests",
            post(submit_handler::<S, D>).get(list_handler::<S, D>),
        )
        .route(
            "/api/v1/requests/statistics",
            get(statistics_handler::<S, D>),
        )
        .route(
            "/api/v1/requests/:id/review",
            post(review_handler::<S, D>),
        )
        .route(
            "/api/v1/requests/:id/approve",
            post(approve_handler::<S, D>),
        )
        .route("/api/v1/requests/:id/reject", post(reject_handler::<S, D>))
        .route(
            "/api/v1/requests/:id/release",
            post(release_handler::<S, D>),
        )
        .route("/api/v1/track/:reference", get(track_handler::<S, D>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveBody {
    pub(crate) certifying_official: String,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectBody {
    pub(crate) reason: String,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransitionBody {
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) status: Option<RequestStatus>,
    pub(crate) document_type: Option<DocumentType>,
    pub(crate) priority: Option<Priority>,
    pub(crate) search: Option<String>,
    pub(crate) from: Option<NaiveDate>,
    pub(crate) to: Option<NaiveDate>,
    pub(crate) page: Option<u32>,
    pub(crate) per_page: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> (RequestFilter, PageRequest) {
        let filter = RequestFilter {
            status: self.status,
            document_type: self.document_type,
            priority: self.priority,
            search: self.search,
            submitted_from: self.from,
            submitted_to: self.to,
        };
        (filter, PageRequest::new(self.page, self.per_page))
    }
}

pub(crate) async fn submit_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    axum::Json(submission): axum::Json<DocumentRequestSubmission>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            let receipt = json!({
                "id": record.id,
                "reference_number": record.reference_number().to_string(),
                "status": record.request.status.label(),
                "processing_fee": record.request.processing_fee,
                "priority": record.request.priority.label(),
            });
            (StatusCode::CREATED, axum::Json(receipt)).into_response()
        }
        Err(err) => lifecycle_error_response(err),
    }
}

pub(crate) async fn review_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    respond_with_detail(service.advance_to_review(RequestId(id)))
}

pub(crate) async fn approve_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Path(id): Path<u64>,
    axum::Json(body): axum::Json<ApproveBody>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    respond_with_detail(service.approve(
        RequestId(id),
        &body.certifying_official,
        body.notes.as_deref(),
    ))
}

pub(crate) async fn reject_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Path(id): Path<u64>,
    axum::Json(body): axum::Json<RejectBody>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    respond_with_detail(service.reject(RequestId(id), &body.reason, body.notes.as_deref()))
}

pub(crate) async fn release_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Path(id): Path<u64>,
    body: Option<axum::Json<TransitionBody>>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    let notes = body.as_ref().and_then(|body| body.notes.as_deref());
    respond_with_detail(service.release(RequestId(id), notes))
}

pub(crate) async fn list_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    let (filter, page) = query.into_parts();
    match service.list(&filter, page) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => lifecycle_error_response(err),
    }
}

pub(crate) async fn statistics_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    let (filter, _) = query.into_parts();
    match service.statistics(&filter) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(err) => lifecycle_error_response(err),
    }
}

pub(crate) async fn track_handler<S, D>(
    State(service): State<Arc<RequestLifecycleService<S, D>>>,
    Path(reference): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    match service.track(&reference) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(TrackingError::NotFound) => {
            let payload = json!({ "error": "no request matches that reference number" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        // Infrastructure trouble stays generic for citizens.
        Err(TrackingError::Unavailable(_)) => {
            let payload = json!({ "error": "lookup temporarily unavailable" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn respond_with_detail(result: Result<super::store::RequestRecord, LifecycleError>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(err) => lifecycle_error_response(err),
    }
}

/// Map engine errors onto HTTP statuses with enough detail to act on:
/// which field failed validation, which status blocked a transition.
fn lifecycle_error_response(err: LifecycleError) -> Response {
    let (status, payload) = match &err {
        LifecycleError::Validation { field } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": err.to_string(), "field": field }),
        ),
        LifecycleError::Fee(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": err.to_string() }),
        ),
        LifecycleError::InvalidTransition { current, .. } => (
            StatusCode::CONFLICT,
            json!({ "error": err.to_string(), "current_status": current.label() }),
        ),
        LifecycleError::ConcurrentModification { .. } => (
            StatusCode::CONFLICT,
            json!({ "error": err.to_string(), "retryable": true }),
        ),
        LifecycleError::RequestNotFound(_) | LifecycleError::ResidentNotFound(_) => (
            StatusCode::NOT_FOUND,
            json!({ "error": err.to_string() }),
        ),
        LifecycleError::Store(_) | LifecycleError::Registry(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": err.to_string() }),
        ),
    };

    (status, axum::Json(payload)).into_response()
}
