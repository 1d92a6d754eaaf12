/// College mentor records
///
/// Mentors supervise approved jobs. Like employees they are staff entries,
/// not accounts, and every query is scoped to the owning `college_id`.
/// Deleting a mentor leaves assigned jobs in place with `mentor_id` cleared.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::normalize_email;
use crate::export::CsvRecord;

/// Mentor row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub id: Uuid,
    pub college_id: Uuid,
    pub name: String,
    pub email: String,
    pub join_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MentorInput {
    pub name: String,
    pub email: String,
    pub join_date: Option<NaiveDate>,
}

const MENTOR_COLUMNS: &str = "id, college_id, name, email, join_date, created_at, updated_at";

impl Mentor {
    pub async fn list(pool: &PgPool, college_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {MENTOR_COLUMNS} FROM mentors WHERE college_id = $1 ORDER BY name, id"
        );

        sqlx::query_as::<_, Mentor>(&sql)
            .bind(college_id)
            .fetch_all(pool)
            .await
    }

    /// Mentor by id, only if it belongs to `college_id`
    pub async fn find_in_college(
        pool: &PgPool,
        college_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {MENTOR_COLUMNS} FROM mentors WHERE id = $1 AND college_id = $2");

        sqlx::query_as::<_, Mentor>(&sql)
            .bind(id)
            .bind(college_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        college_id: Uuid,
        data: MentorInput,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO mentors (college_id, name, email, join_date) \
             VALUES ($1, $2, $3, $4) RETURNING {MENTOR_COLUMNS}"
        );

        sqlx::query_as::<_, Mentor>(&sql)
            .bind(college_id)
            .bind(data.name.trim())
            .bind(normalize_email(&data.email))
            .bind(data.join_date)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        college_id: Uuid,
        id: Uuid,
        data: MentorInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE mentors SET name = $3, email = $4, join_date = $5, updated_at = NOW() \
             WHERE id = $1 AND college_id = $2 RETURNING {MENTOR_COLUMNS}"
        );

        sqlx::query_as::<_, Mentor>(&sql)
            .bind(id)
            .bind(college_id)
            .bind(data.name.trim())
            .bind(normalize_email(&data.email))
            .bind(data.join_date)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, college_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mentors WHERE id = $1 AND college_id = $2")
            .bind(id)
            .bind(college_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool, college_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM mentors WHERE college_id = $1")
            .bind(college_id)
            .fetch_one(pool)
            .await
    }
}

impl CsvRecord for Mentor {
    const HEADERS: &'static [&'static str] = &["id", "name", "email", "join_date", "created_at"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.join_date.map(|d| d.to_string()).unwrap_or_default(),
            self.created_at.to_rfc3339(),
        ]
    }
}
