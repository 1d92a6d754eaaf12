/// Company employee records
///
/// Employees are staff entries maintained by a company account; they do not
/// log in. Every function takes the owning `company_id` and filters on it, so
/// one company can never read or modify another company's employees.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::normalize_email;
use crate::export::CsvRecord;

/// Employee row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,

    /// Unique within the company
    pub email: String,

    pub hire_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name, email and hire date supplied by the company
#[derive(Debug, Clone)]
pub struct EmployeeInput {
    pub name: String,
    pub email: String,
    pub hire_date: Option<NaiveDate>,
}

const EMPLOYEE_COLUMNS: &str = "id, company_id, name, email, hire_date, created_at, updated_at";

impl Employee {
    /// All employees of a company, by name
    pub async fn list(pool: &PgPool, company_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE company_id = $1 ORDER BY name, id"
        );

        sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    /// # Errors
    ///
    /// An email already used inside the company fails with a unique violation.
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: EmployeeInput,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO employees (company_id, name, email, hire_date) \
             VALUES ($1, $2, $3, $4) RETURNING {EMPLOYEE_COLUMNS}"
        );

        sqlx::query_as::<_, Employee>(&sql)
            .bind(company_id)
            .bind(data.name.trim())
            .bind(normalize_email(&data.email))
            .bind(data.hire_date)
            .fetch_one(pool)
            .await
    }

    /// Updates an employee of this company. `None` if missing or foreign.
    pub async fn update(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        data: EmployeeInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE employees SET name = $3, email = $4, hire_date = $5, updated_at = NOW() \
             WHERE id = $1 AND company_id = $2 RETURNING {EMPLOYEE_COLUMNS}"
        );

        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .bind(company_id)
            .bind(data.name.trim())
            .bind(normalize_email(&data.email))
            .bind(data.hire_date)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool, company_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(pool)
            .await
    }
}

impl CsvRecord for Employee {
    const HEADERS: &'static [&'static str] = &["id", "name", "email", "hire_date", "created_at"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.hire_date.map(|d| d.to_string()).unwrap_or_default(),
            self.created_at.to_rfc3339(),
        ]
    }
}
