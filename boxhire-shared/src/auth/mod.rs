/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and length policy
/// - [`jwt`]: HS256 session tokens carrying the user id and role
/// - [`middleware`]: credential extraction (Bearer header or `token` cookie)
/// - [`authorization`]: role checks and organisation lookup for portal routes
///
/// # Example
///
/// ```no_run
/// use boxhire_shared::auth::jwt::{create_token, validate_token, Claims};
/// use boxhire_shared::auth::password::{hash_password, verify_password};
/// use boxhire_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("hunter22")?;
/// assert!(verify_password("hunter22", &hash)?);
///
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let claims = Claims::new(Uuid::new_v4(), UserRole::Member, chrono::Duration::hours(24));
/// let token = create_token(&claims, secret)?;
/// assert_eq!(validate_token(&token, secret)?.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
