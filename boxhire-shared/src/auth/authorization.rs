/// Role checks for portal and admin routes
///
/// Portal handlers never trust an organisation id from the request. They call
/// [`require_company`] or [`require_college`], which check the caller's role
/// and load the organisation owned by the caller's account.

use sqlx::PgPool;

use super::middleware::AuthContext;
use crate::models::organization::{College, Company};
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role does not grant access
    #[error("This action requires the {required} role")]
    WrongRole { required: UserRole, actual: UserRole },

    /// Portal account without its organisation row
    #[error("No {0} profile is linked to this account")]
    MissingOrganization(UserRole),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fails unless the caller has exactly `required`
pub fn require_role(auth: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if auth.role == required {
        Ok(())
    } else {
        Err(AuthzError::WrongRole {
            required,
            actual: auth.role,
        })
    }
}

/// Catalogue editing is admin only
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        return Ok(());
    }

    Err(AuthzError::WrongRole {
        required: UserRole::Admin,
        actual: auth.role,
    })
}

/// Company owned by a `company` caller
pub async fn require_company(pool: &PgPool, auth: &AuthContext) -> Result<Company, AuthzError> {
    require_role(auth, UserRole::Company)?;

    Company::find_by_user(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::MissingOrganization(UserRole::Company))
}

/// College owned by a `college` caller
pub async fn require_college(pool: &PgPool, auth: &AuthContext) -> Result<College, AuthzError> {
    require_role(auth, UserRole::College)?;

    College::find_by_user(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::MissingOrganization(UserRole::College))
}
