/// Catalogue dashboard
///
/// `GET /api/dashboard/stats` answers anonymous and signed-in callers alike.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use boxhire_shared::{
    auth::middleware::AuthContext,
    models::dashboard::{catalogue_dashboard, CatalogueDashboard},
};

/// Totals, top rated boxes, boxes per category and the latest reviews
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<Option<AuthContext>>,
) -> ApiResult<Json<CatalogueDashboard>> {
    let dashboard = catalogue_dashboard(&state.db).await?;

    tracing::debug!(
        user_id = ?auth.map(|a| a.user_id),
        boxes = dashboard.stats.total_boxes,
        "Dashboard stats served"
    );

    Ok(Json(dashboard))
}
