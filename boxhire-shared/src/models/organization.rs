/// Hiring portal organisations
///
/// Each `company` or `college` account owns exactly one organisation row
/// (`user_id` is unique). Every portal query is scoped by the organisation id
/// resolved from the authenticated user, never by an id taken from the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Company organisation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address: String,

    /// Government registration number, unique across companies
    pub registration_no: String,

    pub contact_no: String,
    pub created_at: DateTime<Utc>,
}

/// College organisation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCompany {
    pub user_id: Uuid,
    pub name: String,
    pub address: String,
    pub registration_no: String,
    pub contact_no: String,
}

#[derive(Debug, Clone)]
pub struct CreateCollege {
    pub user_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

/// Organisation attached to an account, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Organization {
    Company(Company),
    College(College),
}

const COMPANY_COLUMNS: &str =
    "id, user_id, name, address, registration_no, contact_no, created_at";
const COLLEGE_COLUMNS: &str = "id, user_id, name, address, phone, created_at";

impl Company {
    pub async fn create<'e, E>(executor: E, data: CreateCompany) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO companies (user_id, name, address, registration_no, contact_no) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLUMNS}"
        );

        sqlx::query_as::<_, Company>(&sql)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.address)
            .bind(data.registration_no)
            .bind(data.contact_no)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Company owned by a user account
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE user_id = $1");
        sqlx::query_as::<_, Company>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn registration_taken(pool: &PgPool, registration_no: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM companies WHERE registration_no = $1)")
            .bind(registration_no.trim())
            .fetch_one(pool)
            .await
    }
}

impl College {
    pub async fn create<'e, E>(executor: E, data: CreateCollege) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO colleges (user_id, name, address, phone) \
             VALUES ($1, $2, $3, $4) RETURNING {COLLEGE_COLUMNS}"
        );

        sqlx::query_as::<_, College>(&sql)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.address)
            .bind(data.phone)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLLEGE_COLUMNS} FROM colleges WHERE id = $1");
        sqlx::query_as::<_, College>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// College owned by a user account
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLLEGE_COLUMNS} FROM colleges WHERE user_id = $1");
        sqlx::query_as::<_, College>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}

impl Organization {
    /// Loads the organisation for a portal account; `None` for box advisor users.
    pub async fn for_user(
        pool: &PgPool,
        user_id: Uuid,
        role: super::user::UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        use super::user::UserRole;

        match role {
            UserRole::Company => Ok(Company::find_by_user(pool, user_id)
                .await?
                .map(Organization::Company)),
            UserRole::College => Ok(College::find_by_user(pool, user_id)
                .await?
                .map(Organization::College)),
            UserRole::Member | UserRole::Admin => Ok(None),
        }
    }
}
