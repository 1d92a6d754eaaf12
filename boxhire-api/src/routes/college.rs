/// College side of the hiring portal
///
/// Handlers resolve the caller's college with [`require_college`]. Jobs,
/// mentors and collaboration requests of other colleges answer 404.
///
/// # Endpoints
///
/// - `GET    /api/college/dashboard`
/// - `GET    /api/college/collab/request?status=pending|accepted|rejected`
/// - `POST   /api/college/collab/request/:companyId` `{ "result": "1" | "0" }`
/// - `GET    /api/college/job/requests?filter=PENDING|ASSIGN_MENTOR|CURRENT|PAST|REJECTED`
/// - `POST   /api/college/job/:id/1` approve, `/0` reject
/// - `POST   /api/college/job/:id/assign-mentor` `{ "mentorId": "..." }`
/// - `GET    /api/college/mentors`
/// - `POST   /api/college/mentors` (also `POST /api/college/create/mentor`)
/// - `GET    /api/college/mentors/export`
/// - `PUT    /api/college/mentors/:id`
/// - `DELETE /api/college/mentors/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::staff::{csv_download, StaffRequest},
};
use axum::{extract::State, http::StatusCode, response::Response, Extension, Json};
use boxhire_shared::{
    auth::{authorization::require_college, middleware::AuthContext},
    models::{
        collaboration::{CollabDecision, CollabRequest, CollabStatus, Collaboration, RelationshipStatus},
        dashboard::{college_dashboard, CollegeDashboard},
        job::{Job, JobDecision, JobDetails, JobStatus},
        mentor::{Mentor, MentorInput},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub filter: Option<String>,
}

/// Decision on a collaboration request; `"1"` accepts, `"0"` rejects
#[derive(Debug, Deserialize)]
pub struct CollabDecisionRequest {
    pub result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMentorRequest {
    pub mentor_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CollabRequestsResponse {
    pub requests: Vec<CollabRequest>,
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
pub struct MentorsResponse {
    pub mentors: Vec<Mentor>,
}

#[derive(Debug, Serialize)]
pub struct MentorResponse {
    pub message: String,
    pub mentor: Mentor,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Accepts `"1"`/`"0"` as strings or numbers.
fn parse_collab_decision(result: &serde_json::Value) -> ApiResult<CollabDecision> {
    let raw = match result {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    CollabDecision::parse(&raw)
        .ok_or_else(|| ApiError::invalid_field("result", "Result must be \"1\" (accept) or \"0\" (reject)"))
}

/// Maps the `status` query of the request list; `NOT_APPLIED` has no rows to list.
fn parse_request_status(raw: Option<&str>) -> ApiResult<Option<CollabStatus>> {
    let filter = RelationshipStatus::parse_filter(raw).map_err(|e| ApiError::invalid_field("status", e))?;

    match filter {
        None => Ok(None),
        Some(RelationshipStatus::NotApplied) => Err(ApiError::invalid_field(
            "status",
            "status must be pending, accepted or rejected",
        )),
        Some(RelationshipStatus::Pending) => Ok(Some(CollabStatus::Pending)),
        Some(RelationshipStatus::Accepted) => Ok(Some(CollabStatus::Accepted)),
        Some(RelationshipStatus::Rejected) => Ok(Some(CollabStatus::Rejected)),
    }
}

fn mentor_input(req: StaffRequest) -> ApiResult<MentorInput> {
    let (name, email, join_date) = req.validated("joinDate")?;
    Ok(MentorInput {
        name,
        email,
        join_date,
    })
}

/// Mentor, job and collaboration counts
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CollegeDashboard>> {
    let college = require_college(&state.db, &auth).await?;
    Ok(Json(college_dashboard(&state.db, college.id).await?))
}

/// Collaboration requests received by this college, newest first
pub async fn list_collab_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<StatusParams>,
) -> ApiResult<Json<CollabRequestsResponse>> {
    let college = require_college(&state.db, &auth).await?;
    let status = parse_request_status(params.status.as_deref())?;

    let requests = Collaboration::requests_for_college(&state.db, college.id, status).await?;

    Ok(Json(CollabRequestsResponse { requests }))
}

/// Accept or reject a pending request
///
/// # Errors
///
/// - 400 if `result` is neither `"1"` nor `"0"`
/// - 404 if the company never asked this college
/// - 409 if the request was already decided
pub async fn respond_collab_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CollabDecisionRequest>,
) -> ApiResult<Json<CollaborationResponse>> {
    let college = require_college(&state.db, &auth).await?;
    let decision = parse_collab_decision(&req.result)?;

    let collaboration = Collaboration::respond(&state.db, college.id, company_id, decision).await?;

    let message = match decision {
        CollabDecision::Accept => "Collaboration accepted",
        CollabDecision::Reject => "Collaboration rejected",
    };

    Ok(Json(CollaborationResponse {
        message: message.to_string(),
        collaboration,
    }))
}

/// Jobs posted to this college, with company and mentor names
pub async fn list_job_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<FilterParams>,
) -> ApiResult<Json<JobsResponse>> {
    let college = require_college(&state.db, &auth).await?;

    let status = JobStatus::parse_filter(params.filter.as_deref())
        .map_err(|e| ApiError::invalid_field("filter", e))?;

    let jobs = Job::list_for_college(&state.db, college.id, status).await?;

    Ok(Json(JobsResponse { jobs }))
}

/// Approve (`1`) or reject (`0`) a pending job
///
/// # Errors
///
/// - 400 for any other decision segment
/// - 404 if the job was posted to another college
/// - 409 if the job is no longer pending
pub async fn decide_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((id, decision)): ApiPath<(Uuid, String)>,
) -> ApiResult<Json<JobResponse>> {
    let college = require_college(&state.db, &auth).await?;

    let decision = JobDecision::parse(&decision)
        .ok_or_else(|| ApiError::BadRequest("Decision must be 1 (approve) or 0 (reject)".to_string()))?;

    let job = Job::decide(&state.db, college.id, id, decision).await?;

    let message = match decision {
        JobDecision::Approve => "Job approved",
        JobDecision::Reject => "Job rejected",
    };

    Ok(Json(JobResponse {
        message: message.to_string(),
        job,
    }))
}

/// Assign one of this college's mentors to an approved job
///
/// # Errors
///
/// - 404 if the job or the mentor belongs to another college
/// - 409 if the job is not awaiting a mentor
pub async fn assign_mentor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssignMentorRequest>,
) -> ApiResult<Json<JobResponse>> {
    let college = require_college(&state.db, &auth).await?;

    let job = Job::assign_mentor(&state.db, college.id, id, req.mentor_id).await?;

    Ok(Json(JobResponse {
        message: "Mentor assigned".to_string(),
        job,
    }))
}

pub async fn list_mentors(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MentorsResponse>> {
    let college = require_college(&state.db, &auth).await?;
    let mentors = Mentor::list(&state.db, college.id).await?;

    Ok(Json(MentorsResponse { mentors }))
}

/// Add a mentor
///
/// # Errors
///
/// - 409 if the email is already used by another mentor of this college
pub async fn create_mentor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<StaffRequest>,
) -> ApiResult<(StatusCode, Json<MentorResponse>)> {
    let college = require_college(&state.db, &auth).await?;
    let input = mentor_input(req)?;

    let mentor = Mentor::create(&state.db, college.id, input).await?;

    tracing::info!(mentor_id = %mentor.id, college_id = %college.id, "Mentor added");

    Ok((
        StatusCode::CREATED,
        Json(MentorResponse {
            message: "Mentor created successfully".to_string(),
            mentor,
        }),
    ))
}

pub async fn update_mentor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StaffRequest>,
) -> ApiResult<Json<MentorResponse>> {
    let college = require_college(&state.db, &auth).await?;
    let input = mentor_input(req)?;

    let mentor = Mentor::update(&state.db, college.id, id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Mentor not found".to_string()))?;

    Ok(Json(MentorResponse {
        message: "Mentor updated successfully".to_string(),
        mentor,
    }))
}

/// Remove a mentor; jobs they supervised keep running without one
pub async fn delete_mentor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let college = require_college(&state.db, &auth).await?;

    if !Mentor::delete(&state.db, college.id, id).await? {
        return Err(ApiError::NotFound("Mentor not found".to_string()));
    }

    tracing::info!(mentor_id = %id, college_id = %college.id, "Mentor removed");

    Ok(Json(MessageResponse {
        message: "Mentor deleted successfully".to_string(),
    }))
}

/// Mentors as `mentors.csv`
pub async fn export_mentors(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    let college = require_college(&state.db, &auth).await?;
    let mentors = Mentor::list(&state.db, college.id).await?;

    csv_download("mentors", &mentors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_collab_decision() {
        assert_eq!(parse_collab_decision(&json!("1")).unwrap(), CollabDecision::Accept);
        assert_eq!(parse_collab_decision(&json!("0")).unwrap(), CollabDecision::Reject);
        assert_eq!(parse_collab_decision(&json!(1)).unwrap(), CollabDecision::Accept);
        assert!(parse_collab_decision(&json!("2")).is_err());
        assert!(parse_collab_decision(&json!(true)).is_err());
        assert!(parse_collab_decision(&json!(null)).is_err());
    }

    #[test]
    fn test_parse_request_status() {
        assert_eq!(parse_request_status(None).unwrap(), None);
        assert_eq!(parse_request_status(Some("all")).unwrap(), None);
        assert_eq!(parse_request_status(Some("pending")).unwrap(), Some(CollabStatus::Pending));
        assert_eq!(parse_request_status(Some("ACCEPTED")).unwrap(), Some(CollabStatus::Accepted));
        assert!(parse_request_status(Some("not_applied")).is_err());
        assert!(parse_request_status(Some("maybe")).is_err());
    }
}
