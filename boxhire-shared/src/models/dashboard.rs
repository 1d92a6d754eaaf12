/// Dashboard aggregates
///
/// Read-only summaries for the box advisor home page and the two portal
/// dashboards. Nothing here is cached; each call runs its queries afresh.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::collaboration::CollabStatus;
use super::job::JobStatus;
use super::review::{RecentReview, Review};
use super::subscription_box::{BoxWithRating, SubscriptionBox};

/// Entries shown in the top-rated and recent-review panels
pub const DASHBOARD_PANEL_SIZE: i64 = 5;

/// Catalogue-wide totals
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueStats {
    pub total_boxes: i64,
    pub average_price: f64,
    pub total_reviews: i64,
    pub average_rating: f64,
}

/// Number of boxes in one category
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Box advisor dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueDashboard {
    pub stats: CatalogueStats,
    pub top_rated_boxes: Vec<BoxWithRating>,
    pub category_distribution: Vec<CategoryCount>,
    pub recent_reviews: Vec<RecentReview>,
}

/// Jobs per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCounts {
    pub pending: i64,
    pub assign_mentor: i64,
    pub current: i64,
    pub past: i64,
    pub rejected: i64,
    pub total: i64,
}

impl JobCounts {
    pub fn from_rows(rows: &[(JobStatus, i64)]) -> Self {
        let mut counts = JobCounts::default();
        for (status, n) in rows {
            match status {
                JobStatus::Pending => counts.pending += n,
                JobStatus::AssignMentor => counts.assign_mentor += n,
                JobStatus::Current => counts.current += n,
                JobStatus::Past => counts.past += n,
                JobStatus::Rejected => counts.rejected += n,
            }
            counts.total += n;
        }
        counts
    }
}

/// Collaborations per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollabCounts {
    pub pending: i64,
    pub accepted: i64,
    pub rejected: i64,
}

impl CollabCounts {
    pub fn from_rows(rows: &[(CollabStatus, i64)]) -> Self {
        let mut counts = CollabCounts::default();
        for (status, n) in rows {
            match status {
                CollabStatus::Pending => counts.pending += n,
                CollabStatus::Accepted => counts.accepted += n,
                CollabStatus::Rejected => counts.rejected += n,
            }
        }
        counts
    }
}

/// Company dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDashboard {
    pub employees: i64,
    pub jobs: JobCounts,
    pub collaborations: CollabCounts,
}

/// College dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeDashboard {
    pub mentors: i64,
    pub jobs: JobCounts,
    pub collaborations: CollabCounts,
}

/// Which side of the portal a count is taken for
#[derive(Debug, Clone, Copy)]
enum OrgColumn {
    Company,
    College,
}

impl OrgColumn {
    fn as_sql(&self) -> &'static str {
        match self {
            OrgColumn::Company => "company_id",
            OrgColumn::College => "college_id",
        }
    }
}

async fn job_counts(pool: &PgPool, column: OrgColumn, org_id: Uuid) -> Result<JobCounts, sqlx::Error> {
    let sql = format!(
        "SELECT status, COUNT(*) FROM jobs WHERE {} = $1 GROUP BY status",
        column.as_sql()
    );
    let rows: Vec<(JobStatus, i64)> = sqlx::query_as(&sql).bind(org_id).fetch_all(pool).await?;
    Ok(JobCounts::from_rows(&rows))
}

async fn collab_counts(
    pool: &PgPool,
    column: OrgColumn,
    org_id: Uuid,
) -> Result<CollabCounts, sqlx::Error> {
    let sql = format!(
        "SELECT status, COUNT(*) FROM collaborations WHERE {} = $1 GROUP BY status",
        column.as_sql()
    );
    let rows: Vec<(CollabStatus, i64)> = sqlx::query_as(&sql).bind(org_id).fetch_all(pool).await?;
    Ok(CollabCounts::from_rows(&rows))
}

/// Totals, top rated boxes, category spread and latest reviews.
pub async fn catalogue_dashboard(pool: &PgPool) -> Result<CatalogueDashboard, sqlx::Error> {
    let stats = sqlx::query_as::<_, CatalogueStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM subscription_boxes) AS total_boxes,
            (SELECT COALESCE(AVG(price), 0)::FLOAT8 FROM subscription_boxes) AS average_price,
            (SELECT COUNT(*) FROM reviews) AS total_reviews,
            (SELECT COALESCE(AVG(rating), 0)::FLOAT8 FROM reviews) AS average_rating
        "#,
    )
    .fetch_one(pool)
    .await?;

    let top_rated_boxes = SubscriptionBox::top_rated(pool, DASHBOARD_PANEL_SIZE).await?;

    let category_distribution = sqlx::query_as::<_, CategoryCount>(
        r#"
        SELECT c.name AS category, COUNT(sb.id) AS count
        FROM categories c
        LEFT JOIN subscription_boxes sb ON sb.category_id = c.id
        GROUP BY c.id, c.name
        ORDER BY count DESC, c.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let recent_reviews = Review::recent(pool, DASHBOARD_PANEL_SIZE).await?;

    Ok(CatalogueDashboard {
        stats,
        top_rated_boxes,
        category_distribution,
        recent_reviews,
    })
}

pub async fn company_dashboard(pool: &PgPool, company_id: Uuid) -> Result<CompanyDashboard, sqlx::Error> {
    Ok(CompanyDashboard {
        employees: super::employee::Employee::count(pool, company_id).await?,
        jobs: job_counts(pool, OrgColumn::Company, company_id).await?,
        collaborations: collab_counts(pool, OrgColumn::Company, company_id).await?,
    })
}

pub async fn college_dashboard(pool: &PgPool, college_id: Uuid) -> Result<CollegeDashboard, sqlx::Error> {
    Ok(CollegeDashboard {
        mentors: super::mentor::Mentor::count(pool, college_id).await?,
        jobs: job_counts(pool, OrgColumn::College, college_id).await?,
        collaborations: collab_counts(pool, OrgColumn::College, college_id).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_counts_from_rows() {
        let counts = JobCounts::from_rows(&[
            (JobStatus::Pending, 3),
            (JobStatus::Current, 2),
            (JobStatus::Past, 1),
        ]);

        assert_eq!(counts.pending, 3);
        assert_eq!(counts.current, 2);
        assert_eq!(counts.past, 1);
        assert_eq!(counts.assign_mentor, 0);
        assert_eq!(counts.total, 6);
    }

    #[test]
    fn test_collab_counts_from_rows() {
        let counts = CollabCounts::from_rows(&[(CollabStatus::Accepted, 4), (CollabStatus::Rejected, 1)]);
        assert_eq!(counts, CollabCounts { pending: 0, accepted: 4, rejected: 1 });
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let json = serde_json::to_value(JobCounts::default()).unwrap();
        assert!(json.get("assignMentor").is_some());
    }
}
