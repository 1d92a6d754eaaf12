/// Company ↔ college collaboration workflow
///
/// # State Machine
///
/// ```text
/// NOT_APPLIED ──request──► PENDING ──accept──► ACCEPTED
///                             │
///                             └────reject────► REJECTED
/// ```
///
/// `NOT_APPLIED` is the absence of a row for the (company, college) pair. The
/// company creates the row; only the college moves it out of `PENDING`, and
/// nothing moves it afterwards.
///
/// Transitions are conditional updates on the one status that
/// [`RelationshipStatus::can_transition_to`] allows into the target, so two
/// racing decisions cannot both succeed: the loser sees a
/// [`TransitionError::Invalid`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::transition::TransitionError;

/// Stored collaboration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "collab_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollabStatus {
    Pending,
    Accepted,
    Rejected,
}

impl CollabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollabStatus::Pending => "PENDING",
            CollabStatus::Accepted => "ACCEPTED",
            CollabStatus::Rejected => "REJECTED",
        }
    }

    /// Parses a status name in any case
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(CollabStatus::Pending),
            "ACCEPTED" | "COLLABORATED" => Some(CollabStatus::Accepted),
            "REJECTED" => Some(CollabStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollabStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship as seen by either side, including the row-less state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipStatus {
    NotApplied,
    Pending,
    Accepted,
    Rejected,
}

impl RelationshipStatus {
    /// Returns true if the workflow allows moving from `self` to `target`
    pub fn can_transition_to(&self, target: RelationshipStatus) -> bool {
        matches!(
            (self, target),
            (RelationshipStatus::NotApplied, RelationshipStatus::Pending)
                | (RelationshipStatus::Pending, RelationshipStatus::Accepted)
                | (RelationshipStatus::Pending, RelationshipStatus::Rejected)
        )
    }

    /// The stored status this relationship was in before reaching `target`
    pub fn stored_source_of(target: CollabStatus) -> Option<CollabStatus> {
        const ALL: [RelationshipStatus; 4] = [
            RelationshipStatus::NotApplied,
            RelationshipStatus::Pending,
            RelationshipStatus::Accepted,
            RelationshipStatus::Rejected,
        ];

        let target = RelationshipStatus::from(Some(target));
        ALL.into_iter()
            .find(|from| from.can_transition_to(target))
            .and_then(RelationshipStatus::stored)
    }

    /// Row status; `NotApplied` has no row
    pub fn stored(self) -> Option<CollabStatus> {
        match self {
            RelationshipStatus::NotApplied => None,
            RelationshipStatus::Pending => Some(CollabStatus::Pending),
            RelationshipStatus::Accepted => Some(CollabStatus::Accepted),
            RelationshipStatus::Rejected => Some(CollabStatus::Rejected),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::NotApplied => "NOT_APPLIED",
            RelationshipStatus::Pending => "PENDING",
            RelationshipStatus::Accepted => "ACCEPTED",
            RelationshipStatus::Rejected => "REJECTED",
        }
    }

    /// Parses a listing filter. `all` (or nothing) means no filter.
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Self>, String> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        match raw.to_ascii_uppercase().as_str() {
            "ALL" => Ok(None),
            "NOT_APPLIED" | "NOTAPPLIED" => Ok(Some(RelationshipStatus::NotApplied)),
            other => CollabStatus::parse(other)
                .map(|s| Some(RelationshipStatus::from(Some(s))))
                .ok_or_else(|| format!("unknown collaboration filter: {raw}")),
        }
    }
}

impl From<Option<CollabStatus>> for RelationshipStatus {
    fn from(status: Option<CollabStatus>) -> Self {
        match status {
            None => RelationshipStatus::NotApplied,
            Some(CollabStatus::Pending) => RelationshipStatus::Pending,
            Some(CollabStatus::Accepted) => RelationshipStatus::Accepted,
            Some(CollabStatus::Rejected) => RelationshipStatus::Rejected,
        }
    }
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// College answer to a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollabDecision {
    Accept,
    Reject,
}

impl CollabDecision {
    /// `"1"` accepts, `"0"` rejects
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(CollabDecision::Accept),
            "0" => Some(CollabDecision::Reject),
            _ => None,
        }
    }

    pub fn target(&self) -> CollabStatus {
        match self {
            CollabDecision::Accept => CollabStatus::Accepted,
            CollabDecision::Reject => CollabStatus::Rejected,
        }
    }
}

/// Collaboration row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: Uuid,
    pub company_id: Uuid,
    pub college_id: Uuid,
    pub status: CollabStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// College as listed for a company, with the pair's relationship
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollegeWithStatus {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,

    #[sqlx(try_from = "Option<CollabStatus>")]
    pub status: RelationshipStatus,
}

/// Requesting company as shown to a college
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanySummary {
    #[sqlx(rename = "company_ref")]
    pub id: Uuid,

    #[sqlx(rename = "company_name")]
    pub name: String,

    #[sqlx(rename = "company_address")]
    pub address: String,
}

/// Collaboration request as listed for a college
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollabRequest {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub collaboration: Collaboration,

    #[sqlx(flatten)]
    pub company: CompanySummary,
}

const COLLAB_COLUMNS: &str = "id, company_id, college_id, status, created_at, updated_at";

impl Collaboration {
    /// Row for a (company, college) pair, if any
    pub async fn find(
        pool: &PgPool,
        company_id: Uuid,
        college_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLLAB_COLUMNS} FROM collaborations WHERE company_id = $1 AND college_id = $2"
        );

        sqlx::query_as::<_, Collaboration>(&sql)
            .bind(company_id)
            .bind(college_id)
            .fetch_optional(pool)
            .await
    }

    /// Company-initiated request: `NOT_APPLIED → PENDING`.
    ///
    /// Returns the row and whether it was created by this call. An existing
    /// row is returned untouched whatever its status.
    pub async fn request(
        pool: &PgPool,
        company_id: Uuid,
        college_id: Uuid,
    ) -> Result<(Self, bool), sqlx::Error> {
        let sql = format!(
            "INSERT INTO collaborations (company_id, college_id, status) \
             VALUES ($1, $2, 'PENDING') \
             ON CONFLICT (company_id, college_id) DO NOTHING \
             RETURNING {COLLAB_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Collaboration>(&sql)
            .bind(company_id)
            .bind(college_id)
            .fetch_optional(pool)
            .await?;

        if let Some(row) = inserted {
            info!(
                collaboration_id = %row.id,
                company_id = %company_id,
                college_id = %college_id,
                "Collaboration requested"
            );
            return Ok((row, true));
        }

        let existing = Self::find(pool, company_id, college_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok((existing, false))
    }

    /// College-initiated decision: `PENDING → ACCEPTED | REJECTED`.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::NotFound`] if the company never asked this college
    /// - [`TransitionError::Invalid`] if the request was already decided
    pub async fn respond(
        pool: &PgPool,
        college_id: Uuid,
        company_id: Uuid,
        decision: CollabDecision,
    ) -> Result<Self, TransitionError> {
        let target = decision.target();
        let source = RelationshipStatus::stored_source_of(target).ok_or_else(|| {
            TransitionError::invalid("collaboration", RelationshipStatus::NotApplied, target)
        })?;
        let sql = format!(
            "UPDATE collaborations SET status = $3, updated_at = NOW() \
             WHERE company_id = $1 AND college_id = $2 AND status = $4 \
             RETURNING {COLLAB_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Collaboration>(&sql)
            .bind(company_id)
            .bind(college_id)
            .bind(target)
            .bind(source)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(row) => {
                info!(
                    collaboration_id = %row.id,
                    company_id = %company_id,
                    college_id = %college_id,
                    status = %row.status,
                    "Collaboration decided"
                );
                Ok(row)
            }
            None => {
                let current = Self::find(pool, company_id, college_id).await?;
                Err(Self::refusal(current.map(|c| c.status), target))
            }
        }
    }

    /// Error for a decision the stored row did not accept
    fn refusal(current: Option<CollabStatus>, target: CollabStatus) -> TransitionError {
        match current {
            None => TransitionError::NotFound {
                entity: "collaboration request",
            },
            Some(status) => TransitionError::invalid("collaboration", status, target),
        }
    }

    /// Returns true if the pair has an accepted collaboration
    pub async fn is_accepted(
        pool: &PgPool,
        company_id: Uuid,
        college_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM collaborations
                WHERE company_id = $1 AND college_id = $2 AND status = 'ACCEPTED'
            )
            "#,
        )
        .bind(company_id)
        .bind(college_id)
        .fetch_one(pool)
        .await
    }

    /// Every college with this company's relationship to it, by name.
    pub async fn colleges_for_company(
        pool: &PgPool,
        company_id: Uuid,
        filter: Option<RelationshipStatus>,
    ) -> Result<Vec<CollegeWithStatus>, sqlx::Error> {
        sqlx::query_as::<_, CollegeWithStatus>(
            r#"
            SELECT col.id, col.name, col.address, col.phone, cb.status
            FROM colleges col
            LEFT JOIN collaborations cb
                   ON cb.college_id = col.id AND cb.company_id = $1
            WHERE $2::text IS NULL
               OR COALESCE(cb.status::text, 'NOT_APPLIED') = $2
            ORDER BY col.name, col.id
            "#,
        )
        .bind(company_id)
        .bind(filter.map(|f| f.as_str()))
        .fetch_all(pool)
        .await
    }

    /// Requests received by a college, newest first.
    pub async fn requests_for_college(
        pool: &PgPool,
        college_id: Uuid,
        status: Option<CollabStatus>,
    ) -> Result<Vec<CollabRequest>, sqlx::Error> {
        sqlx::query_as::<_, CollabRequest>(
            r#"
            SELECT cb.id, cb.company_id, cb.college_id, cb.status, cb.created_at, cb.updated_at,
                   co.id AS company_ref, co.name AS company_name, co.address AS company_address
            FROM collaborations cb
            JOIN companies co ON co.id = cb.company_id
            WHERE cb.college_id = $1
              AND ($2::collab_status IS NULL OR cb.status = $2)
            ORDER BY cb.created_at DESC, cb.id
            "#,
        )
        .bind(college_id)
        .bind(status)
        .fetch_all(pool)
        .await
    }
}
