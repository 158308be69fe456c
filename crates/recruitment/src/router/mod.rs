//! JSON routes over the identity service and the lifecycle managers.

mod auth;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::config::{AuthConfig, LifecycleConfig};
use crate::error::ServiceError;
use crate::identity::{
    IdentityService, LoginOutput, RegisterInput, RegisteredUser, Session, TokenIssuer, UserId,
};
use crate::store::Store;
use crate::workflows::applications::{
    ApplicationId, ApplicationStatus, ApplicationView, CandidateStats,
};
use crate::workflows::jobs::{FinalizeOutcome, JobDraft, JobFilter, JobId, JobPatch, JobView};
use crate::workflows::listing::{PageRequest, Paginated};
use crate::workflows::{ApplicationLifecycleService, JobLifecycleService};

/// Services shared by every handler.
pub struct ApiState<S> {
    pub identity: Arc<IdentityService<S>>,
    pub jobs: Arc<JobLifecycleService<S>>,
    pub applications: Arc<ApplicationLifecycleService<S>>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            jobs: Arc::clone(&self.jobs),
            applications: Arc::clone(&self.applications),
        }
    }
}

impl<S> ApiState<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>, auth: &AuthConfig, lifecycle: LifecycleConfig) -> Self {
        let tokens = TokenIssuer::new(&auth.jwt_secret, auth.token_ttl_hours);
        Self {
            identity: Arc::new(IdentityService::new(
                store.clone(),
                tokens,
                auth.bcrypt_cost,
            )),
            jobs: Arc::new(JobLifecycleService::new(
                store.clone(),
                lifecycle.finalize_mode,
            )),
            applications: Arc::new(ApplicationLifecycleService::new(store)),
        }
    }
}

pub fn api_router<S>(state: ApiState<S>) -> Router
where
    S: Store,
{
    Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
        .route("/jobs", get(list_jobs::<S>).post(create_job::<S>))
        .route("/jobs/mine", get(my_jobs::<S>))
        .route("/jobs/:job_id", get(get_job::<S>).patch(update_job::<S>))
        .route("/jobs/:job_id/finalize", post(finalize_job::<S>))
        .route("/jobs/:job_id/apply", post(apply_to_job::<S>))
        .route("/jobs/:job_id/applications", get(job_applications::<S>))
        .route("/applications", get(my_applications::<S>))
        .route(
            "/applications/:application_id/cancel",
            post(cancel_application::<S>),
        )
        .route("/dashboard/summary", get(dashboard_summary::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct FinalizeRequest {
    candidate_id: u64,
}

/// Query string shared by the listing routes. Everything arrives as text so that a
/// malformed number degrades to the default instead of failing the request.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    q: Option<String>,
    status: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest::from_optional(number(&self.page), number(&self.limit))
    }

    fn job_filter(&self) -> JobFilter {
        JobFilter::new(self.q.as_deref(), self.status.as_deref())
    }
}

fn number(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|value| value.trim().parse().ok())
}

fn path_id(raw: &str, what: &str) -> Result<u64, ServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::invalid_value(format!("invalid {what} id")))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServiceError::invalid_value(rejection.body_text()))
}

async fn blocking<T, F>(work: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ServiceError::Internal(format!("worker task failed: {err}")))?
}

async fn register<S: Store>(
    State(state): State<ApiState<S>>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredUser>), ServiceError> {
    let input = body(payload)?;
    let identity = Arc::clone(&state.identity);
    let user = blocking(move || identity.register(input)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login<S: Store>(
    State(state): State<ApiState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginOutput>, ServiceError> {
    let request = body(payload)?;
    let identity = Arc::clone(&state.identity);
    let output = blocking(move || identity.login(&request.email, &request.password)).await?;
    Ok(Json(output))
}

async fn list_jobs<S: Store>(
    State(state): State<ApiState<S>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<JobView>>, ServiceError> {
    let page = state.jobs.list(&query.job_filter(), query.page_request())?;
    Ok(Json(page))
}

async fn create_job<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    payload: Result<Json<JobDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<JobView>), ServiceError> {
    let draft = body(payload)?;
    let job = state.jobs.create(&session, draft)?;
    Ok((StatusCode::CREATED, Json(job)))
}

async fn my_jobs<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<JobView>>, ServiceError> {
    let page = state
        .jobs
        .list_by_recruiter(&session, &query.job_filter(), query.page_request())?;
    Ok(Json(page))
}

async fn get_job<S: Store>(
    State(state): State<ApiState<S>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobView>, ServiceError> {
    let job_id = JobId(path_id(&job_id, "job")?);
    Ok(Json(state.jobs.get(job_id)?))
}

async fn update_job<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(job_id): Path<String>,
    payload: Result<Json<JobPatch>, JsonRejection>,
) -> Result<Json<JobView>, ServiceError> {
    let job_id = JobId(path_id(&job_id, "job")?);
    let patch = body(payload)?;
    Ok(Json(state.jobs.update(&session, job_id, patch)?))
}

async fn finalize_job<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(job_id): Path<String>,
    payload: Result<Json<FinalizeRequest>, JsonRejection>,
) -> Result<Json<FinalizeOutcome>, ServiceError> {
    let job_id = JobId(path_id(&job_id, "job")?);
    let request = body(payload)?;
    let outcome = state
        .jobs
        .finalize(&session, job_id, UserId(request.candidate_id))?;
    Ok(Json(outcome))
}

async fn apply_to_job<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<ApplicationView>), ServiceError> {
    let job_id = JobId(path_id(&job_id, "job")?);
    let application = state.applications.apply(&session, job_id)?;
    Ok((StatusCode::CREATED, Json(application)))
}

async fn job_applications<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(job_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<ApplicationView>>, ServiceError> {
    let job_id = JobId(path_id(&job_id, "job")?);
    let status = ApplicationStatus::parse_filter(query.status.as_deref());
    let page = state
        .applications
        .list_for_job(&session, job_id, status, query.page_request())?;
    Ok(Json(page))
}

async fn my_applications<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<ApplicationView>>, ServiceError> {
    let page = state
        .applications
        .list_for_candidate(&session, query.page_request())?;
    Ok(Json(page))
}

async fn cancel_application<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationView>, ServiceError> {
    let application_id = ApplicationId(path_id(&application_id, "application")?);
    Ok(Json(state.applications.withdraw(&session, application_id)?))
}

async fn dashboard_summary<S: Store>(
    State(state): State<ApiState<S>>,
    session: Session,
) -> Result<Json<CandidateStats>, ServiceError> {
    Ok(Json(state.applications.stats(&session)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_tolerates_garbage_numbers() {
        let query = ListQuery {
            page: Some("abc".to_string()),
            limit: Some("5".to_string()),
            ..ListQuery::default()
        };
        let page = query.page_request();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn path_ids_must_be_numeric() {
        assert_eq!(path_id("42", "job").expect("numeric"), 42);
        assert!(matches!(
            path_id("abc", "job"),
            Err(ServiceError::InvalidValue(message)) if message == "invalid job id"
        ));
    }
}
