/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a box advisor member
/// - `POST /api/auth/register/company` - Register a company account
/// - `POST /api/auth/register/college` - Register a college account
/// - `POST /api/auth/login` - Login, returns a token and sets the session cookie
/// - `POST /api/auth/logout` - Clears the session cookie
/// - `GET  /api/auth/me` - Current user and organisation
/// - `PUT  /api/auth/profile` - Update name and email
/// - `PUT  /api/auth/password` - Change password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    validation::{not_blank, password_policy},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use boxhire_shared::{
    auth::{
        jwt::{self, Claims},
        middleware::{AuthContext, AUTH_COOKIE},
        password,
    },
    models::{
        organization::{College, Company, CreateCollege, CreateCompany, Organization},
        user::{CreateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Member registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 255), custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "password_policy"))]
    pub password: String,
}

/// Company registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompanyRequest {
    #[validate(
        length(max = 255),
        custom(function = "not_blank", message = "Company name is required")
    )]
    pub name: String,

    #[validate(custom(function = "not_blank", message = "Address is required"))]
    pub address: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "password_policy"))]
    pub password: String,

    pub confirm_password: String,

    #[validate(
        length(max = 100),
        custom(function = "not_blank", message = "Registration number is required")
    )]
    pub registration_no: String,

    #[validate(length(min = 10, max = 32, message = "Contact number must be at least 10 characters"))]
    pub contact_no: String,
}

/// College registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCollegeRequest {
    #[validate(
        length(max = 255),
        custom(function = "not_blank", message = "College name is required")
    )]
    pub name: String,

    #[validate(custom(function = "not_blank", message = "Address is required"))]
    pub address: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 10, max = 32, message = "Phone number must be at least 10 characters"))]
    pub phone: Option<String>,

    #[validate(custom(function = "password_policy"))]
    pub password: String,

    pub confirm_password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255), custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "password_policy"))]
    pub new_password: String,
}

/// Returned by registration and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,

    /// Session JWT, also set as the `token` cookie
    pub token: String,

    pub user: User,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
}

/// Current user with the organisation for portal accounts
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub organization: Option<Organization>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn check_confirmation(password: &str, confirm: &str) -> ApiResult<()> {
    if password != confirm {
        return Err(ApiError::invalid_field("confirmPassword", "Passwords do not match"));
    }
    Ok(())
}

async fn ensure_email_free(state: &AppState, email: &str) -> ApiResult<()> {
    if User::email_taken(&state.db, email, None).await? {
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }
    Ok(())
}

/// Signs a session token for `user`.
fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = Claims::new(user.id, user.role, state.config.token_ttl());
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.config.jwt.cookie_secure)
        .build()
}

/// Register a box advisor member
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// { "name": "Ada", "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// 201 with `{ message, token, user }`.
///
/// # Errors
///
/// - 400 on validation failure
/// - 409 if the email is already registered
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()?;
    ensure_email_free(&state, &req.email).await?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name.trim().to_string(),
            role: UserRole::Member,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = issue_token(&state, &user)?;
    let jar = jar.add(session_cookie(&state, token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user,
            organization: None,
        }),
    ))
}

/// Register a company account
///
/// Creates the user and the company in one transaction.
///
/// # Errors
///
/// - 400 on validation failure or mismatched passwords
/// - 409 if the email or registration number is taken
pub async fn register_company(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterCompanyRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()?;
    check_confirmation(&req.password, &req.confirm_password)?;
    ensure_email_free(&state, &req.email).await?;

    let registration_no = req.registration_no.trim().to_string();
    if Company::registration_taken(&state.db, &registration_no).await? {
        return Err(ApiError::Conflict(
            "Registration number already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;
    let name = req.name.trim().to_string();

    let mut tx = state.db.begin().await?;

    let user = User::create(
        &mut *tx,
        CreateUser {
            email: req.email,
            password_hash,
            name: name.clone(),
            role: UserRole::Company,
        },
    )
    .await?;

    let company = Company::create(
        &mut *tx,
        CreateCompany {
            user_id: user.id,
            name,
            address: req.address.trim().to_string(),
            registration_no,
            contact_no: req.contact_no.trim().to_string(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, company_id = %company.id, "Company registered");

    let token = issue_token(&state, &user)?;
    let jar = jar.add(session_cookie(&state, token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "Company registered successfully".to_string(),
            token,
            user,
            organization: Some(Organization::Company(company)),
        }),
    ))
}

/// Register a college account
///
/// Creates the user and the college in one transaction.
pub async fn register_college(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterCollegeRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate()?;
    check_confirmation(&req.password, &req.confirm_password)?;
    ensure_email_free(&state, &req.email).await?;

    let password_hash = password::hash_password(&req.password)?;
    let name = req.name.trim().to_string();

    let mut tx = state.db.begin().await?;

    let user = User::create(
        &mut *tx,
        CreateUser {
            email: req.email,
            password_hash,
            name: name.clone(),
            role: UserRole::College,
        },
    )
    .await?;

    let college = College::create(
        &mut *tx,
        CreateCollege {
            user_id: user.id,
            name,
            address: req.address.trim().to_string(),
            phone: req.phone.map(|p| p.trim().to_string()),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, college_id = %college.id, "College registered");

    let token = issue_token(&state, &user)?;
    let jar = jar.add(session_cookie(&state, token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "College registered successfully".to_string(),
            token,
            user,
            organization: Some(Organization::College(college)),
        }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// { "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - 401 for an unknown email or a wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let organization = Organization::for_user(&state.db, user.id, user.role).await?;
    let token = issue_token(&state, &user)?;
    let jar = jar.add(session_cookie(&state, token.clone()));

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user,
            organization,
        }),
    ))
}

/// Logout: expires the session cookie. Bearer tokens simply run out.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let mut removal = Cookie::build((AUTH_COOKIE, "")).path("/").build();
    removal.make_removal();
    let jar = jar.add(removal);

    (
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Current user
///
/// `organization` is the company or college record for portal accounts and
/// `null` for members and admins.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let organization = Organization::for_user(&state.db, user.id, user.role).await?;

    Ok(Json(MeResponse { user, organization }))
}

/// Update name and email
///
/// # Errors
///
/// - 409 if another account uses the email
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate()?;

    if User::email_taken(&state.db, &req.email, Some(auth.user_id)).await? {
        return Err(ApiError::Conflict("Email is already taken".to_string()));
    }

    let user = User::update_profile(&state.db, auth.user_id, req.name.trim(), &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully".to_string(),
        user,
    }))
}

/// Change password
///
/// # Errors
///
/// - 400 if the new password is shorter than [`password::MIN_PASSWORD_LENGTH`]
/// - 401 if the current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = RegisterRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let req = RegisterRequest {
            name: "   ".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let req = RegisterCollegeRequest {
            name: "North College".to_string(),
            address: " \t ".to_string(),
            email: "admin@north.edu".to_string(),
            phone: None,
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("address"));
    }

    #[test]
    fn test_password_minimum_is_shared() {
        let at_minimum = "x".repeat(password::MIN_PASSWORD_LENGTH);
        let below = "x".repeat(password::MIN_PASSWORD_LENGTH - 1);

        let register = |password: &str| RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        };
        assert!(register(&at_minimum).validate().is_ok());
        assert!(register(&below).validate().is_err());

        let change = |new_password: &str| ChangePasswordRequest {
            current_password: "secret1".to_string(),
            new_password: new_password.to_string(),
        };
        assert!(change(&at_minimum).validate().is_ok());
        assert!(change(&below).validate().is_err());
    }

    #[test]
    fn test_college_phone_is_optional_but_checked() {
        let mut req = RegisterCollegeRequest {
            name: "North College".to_string(),
            address: "1 Campus Road".to_string(),
            email: "admin@north.edu".to_string(),
            phone: None,
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert!(req.validate().is_ok());

        req.phone = Some("12345".to_string());
        assert!(req.validate().is_err());

        req.phone = Some("0123456789".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_company_request_uses_camel_case() {
        let req: RegisterCompanyRequest = serde_json::from_value(serde_json::json!({
            "name": "Acme",
            "address": "2 Market St",
            "email": "hr@acme.io",
            "password": "secret1",
            "confirmPassword": "secret1",
            "registrationNo": "REG-001",
            "contactNo": "0123456789"
        }))
        .unwrap();

        assert_eq!(req.registration_no, "REG-001");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_check_confirmation() {
        assert!(check_confirmation("secret1", "secret1").is_ok());
        assert!(matches!(
            check_confirmation("secret1", "secret2"),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_change_password_rejects_short_password() {
        let req = ChangePasswordRequest {
            current_password: "secret1".to_string(),
            new_password: "abc".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        use axum::response::IntoResponse;

        let response = logout(CookieJar::new()).await.into_response();
        let set_cookie = response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();

        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
