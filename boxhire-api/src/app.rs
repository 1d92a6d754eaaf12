/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use boxhire_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = boxhire_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use boxhire_shared::auth::middleware::{authenticate, AuthContext, AuthError};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /health                                  public
/// /api/auth/       register[/company|/college], login, logout   public
///                  me, profile, password                        JWT
/// /api/boxes/      list, categories/all, compare, :id           public
///                  create, update, delete                       JWT (admin)
/// /api/reviews/    box/:boxId                                   public
///                  create, update, delete, user/me              JWT
/// /api/dashboard/  stats                                        optional JWT
/// /api/company/    colleges, collab, jobs, employees, dashboard JWT (company)
/// /api/college/    collab, job, mentors, dashboard              JWT (college)
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, compression,
/// then authentication per route group.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let jwt = || axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/register/company", post(routes::auth::register_company))
        .route("/register/college", post(routes::auth::register_college))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .route("/profile", put(routes::auth::update_profile))
                .route("/password", put(routes::auth::change_password))
                .layer(jwt()),
        );

    let box_routes = Router::new()
        .route("/", get(routes::boxes::list_boxes))
        .route("/categories/all", get(routes::boxes::list_categories))
        .route("/compare", get(routes::boxes::compare_boxes))
        .route("/:id", get(routes::boxes::get_box))
        .merge(
            Router::new()
                .route("/", post(routes::boxes::create_box))
                .route(
                    "/:id",
                    put(routes::boxes::update_box).delete(routes::boxes::delete_box),
                )
                .layer(jwt()),
        );

    let review_routes = Router::new()
        .route("/box/:box_id", get(routes::reviews::list_box_reviews))
        .merge(
            Router::new()
                .route("/", post(routes::reviews::create_review))
                .route("/user/me", get(routes::reviews::my_reviews))
                .route(
                    "/:id",
                    put(routes::reviews::update_review).delete(routes::reviews::delete_review),
                )
                .layer(jwt()),
        );

    let dashboard_routes = Router::new()
        .route("/stats", get(routes::dashboard::stats))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth_layer,
        ));

    let company_routes = Router::new()
        .route("/dashboard", get(routes::company::dashboard))
        .route("/college", get(routes::company::list_colleges))
        .route("/collab/:college_id", post(routes::company::request_collaboration))
        .route(
            "/jobs",
            get(routes::company::list_jobs).post(routes::company::create_job),
        )
        .route(
            "/employees",
            get(routes::company::list_employees).post(routes::company::create_employee),
        )
        .route("/employees/export", get(routes::company::export_employees))
        .route(
            "/employees/:id",
            put(routes::company::update_employee).delete(routes::company::delete_employee),
        )
        .layer(jwt());

    let college_routes = Router::new()
        .route("/dashboard", get(routes::college::dashboard))
        .route("/collab/request", get(routes::college::list_collab_requests))
        .route(
            "/collab/request/:company_id",
            post(routes::college::respond_collab_request),
        )
        .route("/job/requests", get(routes::college::list_job_requests))
        .route("/job/:id/assign-mentor", post(routes::college::assign_mentor))
        .route("/job/:id/:decision", post(routes::college::decide_job))
        .route(
            "/mentors",
            get(routes::college::list_mentors).post(routes::college::create_mentor),
        )
        .route("/create/mentor", post(routes::college::create_mentor))
        .route("/mentors/export", get(routes::college::export_mentors))
        .route(
            "/mentors/:id",
            put(routes::college::update_mentor).delete(routes::college::delete_mentor),
        )
        .layer(jwt());

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/boxes", box_routes)
        .nest("/reviews", review_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/company", company_routes)
        .nest("/college", college_routes);

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Reads the Bearer header or the session cookie, validates the token and
/// injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Like [`jwt_auth_layer`] but never rejects a bad or missing token.
///
/// Inserts `Option<AuthContext>`.
async fn optional_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: Option<AuthContext> =
        match authenticate(&state.db, state.jwt_secret(), req.headers()).await {
            Ok(auth) => Some(auth),
            Err(AuthError::Database(e)) => return Err(e.into()),
            Err(_) => None,
        };

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
