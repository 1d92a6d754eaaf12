/// Company side of the hiring portal
///
/// Every handler starts with [`require_company`], which rejects non-company
/// callers with 403 and resolves the caller's own company. Nothing is looked
/// up by a company id taken from the request.
///
/// # Endpoints
///
/// - `GET    /api/company/dashboard`
/// - `GET    /api/company/college?filter=all|not_applied|pending|accepted|rejected`
/// - `POST   /api/company/collab/:collegeId`
/// - `GET    /api/company/jobs?filter=...`
/// - `POST   /api/company/jobs`
/// - `GET    /api/company/employees`
/// - `POST   /api/company/employees`
/// - `GET    /api/company/employees/export`
/// - `PUT    /api/company/employees/:id`
/// - `DELETE /api/company/employees/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::staff::{csv_download, StaffRequest},
    validation::not_blank,
};
use axum::{extract::State, http::StatusCode, response::Response, Extension, Json};
use boxhire_shared::{
    auth::{authorization::require_company, middleware::AuthContext},
    models::{
        collaboration::{Collaboration, CollegeWithStatus, RelationshipStatus},
        dashboard::{company_dashboard, CompanyDashboard},
        employee::{Employee, EmployeeInput},
        job::{Job, JobDetails, JobStatus, NewJob},
        organization::College,
    },
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub filter: Option<String>,
}

/// New job posting
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub college_id: Uuid,

    #[validate(length(max = 255), custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(max = 100, message = "Salary must be at most 100 characters"))]
    pub salary: Option<String>,

    /// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM`, or a bare date meaning end of day (UTC)
    pub deadline: String,
}

#[derive(Debug, Serialize)]
pub struct CollegesResponse {
    pub colleges: Vec<CollegeWithStatus>,
}

#[derive(Debug, Serialize)]
pub struct CollaborationResponse {
    pub message: String,
    pub collaboration: Collaboration,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobDetails>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub message: String,
    pub job: Job,
}

#[derive(Debug, Serialize)]
pub struct EmployeesResponse {
    pub employees: Vec<Employee>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub message: String,
    pub employee: Employee,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Parses a job deadline.
pub fn parse_deadline(raw: &str) -> ApiResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(local.and_utc());
    }
    if let Some(end_of_day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
    {
        return Ok(end_of_day.and_utc());
    }

    Err(ApiError::invalid_field(
        "deadline",
        "Deadline must be a date or an RFC 3339 timestamp",
    ))
}

fn employee_input(req: StaffRequest) -> ApiResult<EmployeeInput> {
    let (name, email, hire_date) = req.validated("hireDate")?;
    Ok(EmployeeInput {
        name,
        email,
        hire_date,
    })
}

/// Employee, job and collaboration counts
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CompanyDashboard>> {
    let company = require_company(&state.db, &auth).await?;
    Ok(Json(company_dashboard(&state.db, company.id).await?))
}

/// Every college with this company's collaboration status
///
/// A college the company never contacted shows as `NOT_APPLIED`.
pub async fn list_colleges(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<FilterParams>,
) -> ApiResult<Json<CollegesResponse>> {
    let company = require_company(&state.db, &auth).await?;

    let filter = RelationshipStatus::parse_filter(params.filter.as_deref())
        .map_err(|e| ApiError::invalid_field("filter", e))?;

    let colleges = Collaboration::colleges_for_company(&state.db, company.id, filter).await?;

    Ok(Json(CollegesResponse { colleges }))
}

/// Ask a college to collaborate
///
/// # Response
///
/// - 201 with the new `PENDING` row
/// - 200 with the existing row, unchanged, if the pair already has one
///
/// # Errors
///
/// - 404 if the college does not exist
pub async fn request_collaboration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(college_id): ApiPath<Uuid>,
) -> ApiResult<(StatusCode, Json<CollaborationResponse>)> {
    let company = require_company(&state.db, &auth).await?;

    if College::find_by_id(&state.db, college_id).await?.is_none() {
        return Err(ApiError::NotFound("College not found".to_string()));
    }

    let (collaboration, created) = Collaboration::request(&state.db, company.id, college_id).await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Collaboration request sent")
    } else {
        (StatusCode::OK, "Collaboration request already exists")
    };

    Ok((
        status,
        Json(CollaborationResponse {
            message: message.to_string(),
            collaboration,
        }),
    ))
}

/// Jobs posted by this company
///
/// `filter` accepts `pending`, `accepted` (awaiting a mentor), `current`,
/// `past`, `rejected` or `all`.
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<FilterParams>,
) -> ApiResult<Json<JobsResponse>> {
    let company = require_company(&state.db, &auth).await?;

    let status = JobStatus::parse_filter(params.filter.as_deref())
        .map_err(|e| ApiError::invalid_field("filter", e))?;

    let jobs = Job::list_for_company(&state.db, company.id, status).await?;

    Ok(Json(JobsResponse { jobs }))
}

/// Post a job to a collaborating college
///
/// # Errors
///
/// - 400 on validation failure or a deadline that is not in the future
/// - 403 unless the company has an accepted collaboration with the college
pub async fn create_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<JobResponse>)> {
    let company = require_company(&state.db, &auth).await?;
    req.validate()?;

    let deadline = parse_deadline(&req.deadline)?;
    if deadline <= Utc::now() {
        return Err(ApiError::invalid_field("deadline", "Deadline must be in the future"));
    }

    if !Collaboration::is_accepted(&state.db, company.id, req.college_id).await? {
        return Err(ApiError::Forbidden(
            "Your company does not have an accepted collaboration with this college".to_string(),
        ));
    }

    let job = Job::create(
        &state.db,
        company.id,
        NewJob {
            college_id: req.college_id,
            title: req.title.trim().to_string(),
            description: req.description,
            salary: req.salary.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            deadline,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            message: "Job posted successfully".to_string(),
            job,
        }),
    ))
}

pub async fn list_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<EmployeesResponse>> {
    let company = require_company(&state.db, &auth).await?;
    let employees = Employee::list(&state.db, company.id).await?;

    Ok(Json(EmployeesResponse { employees }))
}

/// Add an employee
///
/// # Errors
///
/// - 409 if the email is already used by another employee of this company
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<StaffRequest>,
) -> ApiResult<(StatusCode, Json<EmployeeResponse>)> {
    let company = require_company(&state.db, &auth).await?;
    let input = employee_input(req)?;

    let employee = Employee::create(&state.db, company.id, input).await?;

    tracing::info!(employee_id = %employee.id, company_id = %company.id, "Employee added");

    Ok((
        StatusCode::CREATED,
        Json(EmployeeResponse {
            message: "Employee added successfully".to_string(),
            employee,
        }),
    ))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StaffRequest>,
) -> ApiResult<Json<EmployeeResponse>> {
    let company = require_company(&state.db, &auth).await?;
    let input = employee_input(req)?;

    let employee = Employee::update(&state.db, company.id, id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(Json(EmployeeResponse {
        message: "Employee updated successfully".to_string(),
        employee,
    }))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let company = require_company(&state.db, &auth).await?;

    if !Employee::delete(&state.db, company.id, id).await? {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }

    tracing::info!(employee_id = %id, company_id = %company.id, "Employee removed");

    Ok(Json(MessageResponse {
        message: "Employee deleted successfully".to_string(),
    }))
}

/// Employees as `employees.csv`
pub async fn export_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    let company = require_company(&state.db, &auth).await?;
    let employees = Employee::list(&state.db, company.id).await?;

    csv_download("employees", &employees)
}
