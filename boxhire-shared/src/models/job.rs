/// Job postings and the approval / mentor-assignment workflow
///
/// # State Machine
///
/// ```text
/// PENDING ──approve──► ASSIGN_MENTOR ──assign mentor──► CURRENT ──deadline──► PAST
///    │
///    └─────reject────► REJECTED
/// ```
///
/// A company posts a job to a college it has an accepted collaboration with.
/// The college approves or rejects it, then assigns one of its own mentors.
/// Current jobs become past once their deadline has gone by; the worker's
/// sweep applies that move with [`Job::expire_past_deadline`].
///
/// Every transition is a conditional update on the expected status. When it
/// touches no row the job is re-read to report either "not found" (missing or
/// posted to another college) or an invalid transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::transition::TransitionError;

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting for the college's decision
    Pending,

    /// Declined by the college (terminal)
    Rejected,

    /// Approved, waiting for a mentor
    AssignMentor,

    /// Mentor assigned, deadline not yet reached
    Current,

    /// Deadline passed (terminal)
    Past,
}

impl JobStatus {
    /// All states, in workflow order
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Pending,
        JobStatus::AssignMentor,
        JobStatus::Current,
        JobStatus::Past,
        JobStatus::Rejected,
    ];

    /// Returns true if the workflow allows moving from `self` to `target`
    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        matches!(
            (self, target),
            (JobStatus::Pending, JobStatus::AssignMentor)
                | (JobStatus::Pending, JobStatus::Rejected)
                | (JobStatus::AssignMentor, JobStatus::Current)
                | (JobStatus::Current, JobStatus::Past)
        )
    }

    /// The state a job must be in to move to `target`. Every state has at
    /// most one way in.
    pub fn source_of(target: JobStatus) -> Option<JobStatus> {
        Self::ALL
            .into_iter()
            .find(|from| from.can_transition_to(target))
    }

    /// Source state for a transition the workflow defines
    fn expected_before(target: JobStatus) -> Result<JobStatus, TransitionError> {
        Self::source_of(target).ok_or_else(|| TransitionError::invalid("job", "any state", target))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Rejected => "REJECTED",
            JobStatus::AssignMentor => "ASSIGN_MENTOR",
            JobStatus::Current => "CURRENT",
            JobStatus::Past => "PAST",
        }
    }

    /// Parses a status name in any case. `accepted` is an alias for
    /// `ASSIGN_MENTOR`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(JobStatus::Pending),
            "REJECTED" => Some(JobStatus::Rejected),
            "ASSIGN_MENTOR" | "ACCEPTED" | "APPROVED" => Some(JobStatus::AssignMentor),
            "CURRENT" => Some(JobStatus::Current),
            "PAST" => Some(JobStatus::Past),
            _ => None,
        }
    }

    /// Parses a listing filter. `all` (or nothing) means no filter.
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Self>, String> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => Self::parse(s)
                .map(Some)
                .ok_or_else(|| format!("unknown job filter: {s}")),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// College decision on a pending job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDecision {
    Approve,
    Reject,
}

impl JobDecision {
    /// Path segment `1` approves, `0` rejects
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(JobDecision::Approve),
            "0" => Some(JobDecision::Reject),
            _ => None,
        }
    }

    pub fn target(&self) -> JobStatus {
        match self {
            JobDecision::Approve => JobStatus::AssignMentor,
            JobDecision::Reject => JobStatus::Rejected,
        }
    }
}

/// Job row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub college_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub deadline: DateTime<Utc>,
    pub status: JobStatus,
    pub mentor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job with the names both sides display
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,

    pub company_name: String,
    pub college_name: String,
    pub mentor_name: Option<String>,
}

/// Company input for a new posting
#[derive(Debug, Clone)]
pub struct NewJob {
    pub college_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub deadline: DateTime<Utc>,
}

const JOB_COLUMNS: &str = "id, company_id, college_id, title, description, salary, deadline, \
                           status, mentor_id, created_at, updated_at";

const JOB_DETAILS: &str = r#"
    SELECT j.id, j.company_id, j.college_id, j.title, j.description, j.salary, j.deadline,
           j.status, j.mentor_id, j.created_at, j.updated_at,
           co.name AS company_name, col.name AS college_name, m.name AS mentor_name
    FROM jobs j
    JOIN companies co ON co.id = j.company_id
    JOIN colleges col ON col.id = j.college_id
    LEFT JOIN mentors m ON m.id = j.mentor_id
"#;

impl Job {
    /// Inserts a `PENDING` job. Collaboration and deadline checks are the
    /// caller's responsibility.
    pub async fn create(pool: &PgPool, company_id: Uuid, data: NewJob) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO jobs (company_id, college_id, title, description, salary, deadline) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {JOB_COLUMNS}"
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(company_id)
            .bind(data.college_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.salary)
            .bind(data.deadline)
            .fetch_one(pool)
            .await?;

        info!(job_id = %job.id, company_id = %company_id, college_id = %job.college_id, "Job posted");
        Ok(job)
    }

    /// Job by id, only if it was posted to `college_id`
    pub async fn find_for_college(
        pool: &PgPool,
        college_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND college_id = $2");

        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(college_id)
            .fetch_optional(pool)
            .await
    }

    /// Jobs posted to a college, newest first
    pub async fn list_for_college(
        pool: &PgPool,
        college_id: Uuid,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobDetails>, sqlx::Error> {
        let sql = format!(
            "{JOB_DETAILS} WHERE j.college_id = $1 \
               AND ($2::job_status IS NULL OR j.status = $2) \
             ORDER BY j.created_at DESC, j.id"
        );

        sqlx::query_as::<_, JobDetails>(&sql)
            .bind(college_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Jobs posted by a company, newest first
    pub async fn list_for_company(
        pool: &PgPool,
        company_id: Uuid,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobDetails>, sqlx::Error> {
        let sql = format!(
            "{JOB_DETAILS} WHERE j.company_id = $1 \
               AND ($2::job_status IS NULL OR j.status = $2) \
             ORDER BY j.created_at DESC, j.id"
        );

        sqlx::query_as::<_, JobDetails>(&sql)
            .bind(company_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// College decision: `PENDING → ASSIGN_MENTOR | REJECTED`.
    pub async fn decide(
        pool: &PgPool,
        college_id: Uuid,
        id: Uuid,
        decision: JobDecision,
    ) -> Result<Self, TransitionError> {
        let target = decision.target();
        let source = JobStatus::expected_before(target)?;
        let sql = format!(
            "UPDATE jobs SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND college_id = $2 AND status = $4 \
             RETURNING {JOB_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(college_id)
            .bind(target)
            .bind(source)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(job) => {
                info!(job_id = %job.id, college_id = %college_id, status = %job.status, "Job decided");
                Ok(job)
            }
            None => Err(Self::diagnose(pool, college_id, id, target)
                .await?
                .unwrap_or_else(|| TransitionError::invalid("job", source, target))),
        }
    }

    /// `ASSIGN_MENTOR → CURRENT`, recording the mentor.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::NotFound`] for a job or mentor outside the college
    /// - [`TransitionError::Invalid`] if the job is not awaiting a mentor
    pub async fn assign_mentor(
        pool: &PgPool,
        college_id: Uuid,
        id: Uuid,
        mentor_id: Uuid,
    ) -> Result<Self, TransitionError> {
        let target = JobStatus::Current;
        let source = JobStatus::expected_before(target)?;
        let sql = format!(
            "UPDATE jobs SET status = $4, mentor_id = $3, updated_at = NOW() \
             WHERE id = $1 AND college_id = $2 AND status = $5 \
               AND EXISTS (SELECT 1 FROM mentors m WHERE m.id = $3 AND m.college_id = $2) \
             RETURNING {JOB_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(college_id)
            .bind(mentor_id)
            .bind(target)
            .bind(source)
            .fetch_optional(pool)
            .await?;

        if let Some(job) = updated {
            info!(
                job_id = %job.id,
                college_id = %college_id,
                mentor_id = %mentor_id,
                "Mentor assigned"
            );
            return Ok(job);
        }

        // An eligible job means the mentor condition failed
        let Some(err) = Self::diagnose(pool, college_id, id, target).await? else {
            return Err(TransitionError::NotFound { entity: "mentor" });
        };

        if matches!(err, TransitionError::Invalid { .. })
            && super::mentor::Mentor::find_in_college(pool, college_id, mentor_id)
                .await?
                .is_none()
        {
            return Err(TransitionError::NotFound { entity: "mentor" });
        }

        Err(err)
    }

    /// Explains why a conditional transition matched no row.
    ///
    /// Returns `None` when the job exists and its current status allows the
    /// move, so the failure came from another condition of the update.
    async fn diagnose(
        pool: &PgPool,
        college_id: Uuid,
        id: Uuid,
        target: JobStatus,
    ) -> Result<Option<TransitionError>, sqlx::Error> {
        let job = Self::find_for_college(pool, college_id, id).await?;
        Ok(Self::refusal(job.map(|j| j.status), target))
    }

    /// Error for a transition refused by the stored status
    fn refusal(current: Option<JobStatus>, target: JobStatus) -> Option<TransitionError> {
        match current {
            None => Some(TransitionError::NotFound { entity: "job" }),
            Some(status) if status.can_transition_to(target) => None,
            Some(status) => Some(TransitionError::invalid("job", status, target)),
        }
    }

    /// Moves every current job whose deadline has passed to `PAST`.
    ///
    /// Returns the number of jobs moved.
    pub async fn expire_past_deadline(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let target = JobStatus::Past;
        let Some(source) = JobStatus::source_of(target) else {
            return Ok(0);
        };

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1, updated_at = NOW()
            WHERE status = $2 AND deadline < NOW()
            "#,
        )
        .bind(target)
        .bind(source)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
