use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::isolation::{
    AuthError, ConnectionPool, IsolationError, PooledConnection, RecordId, RowStore, TenantId,
    TenantScoped,
};

use super::ats::{JobPosting, PostingStatus};
use super::hr::Employee;

/// Maps a verified credential to the organization it authenticates.
pub trait TenantResolver: Send + Sync {
    fn resolve(&self, credential: &str) -> Option<TenantId>;
}

impl TenantResolver for HashMap<String, TenantId> {
    fn resolve(&self, credential: &str) -> Option<TenantId> {
        self.get(credential).copied()
    }
}

pub struct SuiteState<S: RowStore> {
    pool: ConnectionPool<S>,
    resolver: Arc<dyn TenantResolver>,
}

/// Router exposing a tenant-scoped slice of the suite tables.
pub fn suite_router<S>(pool: ConnectionPool<S>, resolver: Arc<dyn TenantResolver>) -> Router
where
    S: RowStore + 'static,
{
    let state = Arc::new(SuiteState { pool, resolver });
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs::<S>).post(create_job::<S>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(job_handler::<S>).delete(delete_job_handler::<S>),
        )
        .route(
            "/api/v1/employees",
            get(list_employees::<S>).post(create_employee::<S>),
        )
        .route("/api/v1/employees/:employee_id", get(employee_handler::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobPostingRequest {
    pub(crate) title: String,
    pub(crate) department: String,
    #[serde(default)]
    pub(crate) status: Option<PostingStatus>,
    #[serde(default)]
    pub(crate) opened_on: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) organization_id: Option<TenantId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmployeeRequest {
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) department: String,
    pub(crate) hired_on: NaiveDate,
    #[serde(default)]
    pub(crate) organization_id: Option<TenantId>,
}

/// Check out a connection bound to the caller's organization. The tenant comes only from
/// the bearer credential; request bodies never choose it.
fn open_session<S: RowStore>(
    state: &SuiteState<S>,
    headers: &HeaderMap,
) -> Result<PooledConnection<S>, Response> {
    let tenant = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|credential| !credential.is_empty())
        .and_then(|credential| state.resolver.resolve(credential))
        .ok_or_else(|| failure(IsolationError::from(AuthError::AuthenticationRequired)))?;

    let mut connection = state.pool.acquire().map_err(failure)?;
    connection.set_current_tenant(tenant);
    Ok(connection)
}

pub(crate) async fn list_jobs<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    match connection.select::<JobPosting>() {
        Ok(postings) => (StatusCode::OK, axum::Json(postings)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn create_job<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<JobPostingRequest>,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    let mut posting = JobPosting::draft(request.title, request.department);
    posting.organization_id = request.organization_id;
    posting.opened_on = request.opened_on;
    if let Some(status) = request.status {
        posting.status = status;
    }
    match connection.insert(posting) {
        Ok(posting) => (StatusCode::CREATED, axum::Json(posting)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn job_handler<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    let id = match record_id::<JobPosting>(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match connection.get::<JobPosting>(id) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn delete_job_handler<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    let id = match record_id::<JobPosting>(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match connection.delete::<JobPosting>(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn list_employees<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    match connection.select::<Employee>() {
        Ok(employees) => (StatusCode::OK, axum::Json(employees)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn create_employee<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<EmployeeRequest>,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    let mut employee = Employee::new(
        request.full_name,
        request.email,
        request.department,
        request.hired_on,
    );
    employee.organization_id = request.organization_id;
    match connection.insert(employee) {
        Ok(employee) => (StatusCode::CREATED, axum::Json(employee)).into_response(),
        Err(err) => failure(err),
    }
}

pub(crate) async fn employee_handler<S: RowStore>(
    State(state): State<Arc<SuiteState<S>>>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
) -> Response {
    let connection = match open_session(&state, &headers) {
        Ok(connection) => connection,
        Err(response) => return response,
    };
    let id = match record_id::<Employee>(&employee_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match connection.get::<Employee>(id) {
        Ok(employee) => (StatusCode::OK, axum::Json(employee)).into_response(),
        Err(err) => failure(err),
    }
}

/// Unparseable ids answer exactly like ids that are missing or foreign.
fn record_id<T: TenantScoped>(raw: &str) -> Result<RecordId, Response> {
    raw.parse().map_err(|_| {
        failure(IsolationError::NotFoundOrForbidden {
            table: T::TABLE,
            id: RecordId(Uuid::nil()),
        })
    })
}

fn failure(err: impl Into<AppError>) -> Response {
    err.into().into_response()
}
