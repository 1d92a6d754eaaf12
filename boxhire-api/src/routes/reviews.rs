/// Review endpoints
///
/// # Endpoints
///
/// - `GET    /api/reviews/box/:boxId` - Reviews for a box, paginated
/// - `POST   /api/reviews` - Review a box (one per user and box)
/// - `PUT    /api/reviews/:id` - Edit own review
/// - `DELETE /api/reviews/:id` - Delete own review
/// - `GET    /api/reviews/user/me` - Caller's reviews with box summaries
///
/// Editing or deleting someone else's review answers 404, exactly like a
/// missing review.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::boxes::parse_param,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use boxhire_shared::{
    auth::middleware::AuthContext,
    models::{
        review::{is_valid_rating, parse_review_sort, Review, ReviewWithBox, ReviewWithUser, MAX_RATING, MIN_RATING},
        subscription_box::SubscriptionBox,
    },
    pagination::{PageInfo, Pagination},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for review lists
pub const DEFAULT_REVIEW_LIMIT: i64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ReviewListParams {
    fn pagination(&self) -> ApiResult<Pagination> {
        Ok(Pagination::new(
            parse_param("page", self.page.as_deref())?,
            parse_param("limit", self.limit.as_deref())?,
            DEFAULT_REVIEW_LIMIT,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub box_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse<T> {
    pub reviews: Vec<T>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub review: ReviewWithUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn check_rating(rating: i32) -> ApiResult<()> {
    if !is_valid_rating(rating) {
        return Err(ApiError::invalid_field(
            "rating",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
        ));
    }
    Ok(())
}

/// Blank comments are stored as `NULL`.
fn clean_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

async fn load_review(state: &AppState, id: Uuid) -> ApiResult<ReviewWithUser> {
    Review::find_with_user(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))
}

/// Reviews for a box
///
/// # Endpoint
///
/// ```text
/// GET /api/reviews/box/:boxId?page=1&limit=10&sortBy=rating&sortOrder=DESC
/// ```
///
/// Defaults to newest first.
pub async fn list_box_reviews(
    State(state): State<AppState>,
    ApiPath(box_id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<ReviewListParams>,
) -> ApiResult<Json<ReviewListResponse<ReviewWithUser>>> {
    let page = params.pagination()?;
    let sort = parse_review_sort(params.sort_by.as_deref(), params.sort_order.as_deref());

    let (reviews, total) = Review::list_for_box(&state.db, box_id, sort, page).await?;

    Ok(Json(ReviewListResponse {
        reviews,
        pagination: page.info(total),
    }))
}

/// Create a review
///
/// # Errors
///
/// - 400 if the rating is outside 1..=5
/// - 404 if the box does not exist
/// - 400 if the caller already reviewed this box
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewResponse>)> {
    check_rating(req.rating)?;

    if !SubscriptionBox::exists(&state.db, req.box_id).await? {
        return Err(ApiError::NotFound("Subscription box not found".to_string()));
    }

    if Review::exists_for(&state.db, auth.user_id, req.box_id).await? {
        return Err(ApiError::BadRequest(
            "You have already reviewed this box".to_string(),
        ));
    }

    // A concurrent duplicate still trips reviews_user_box_key
    let review = Review::create(
        &state.db,
        auth.user_id,
        req.box_id,
        req.rating,
        clean_comment(req.comment),
    )
    .await?;

    tracing::info!(review_id = %review.id, box_id = %review.box_id, user_id = %auth.user_id, "Review created");

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            message: "Review created successfully".to_string(),
            review: load_review(&state, review.id).await?,
        }),
    ))
}

/// Edit own review
pub async fn update_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    check_rating(req.rating)?;

    Review::update_owned(&state.db, id, auth.user_id, req.rating, clean_comment(req.comment))
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "Review not found or you do not have permission to edit it".to_string(),
            )
        })?;

    Ok(Json(ReviewResponse {
        message: "Review updated successfully".to_string(),
        review: load_review(&state, id).await?,
    }))
}

/// Delete own review
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !Review::delete_owned(&state.db, id, auth.user_id).await? {
        return Err(ApiError::NotFound(
            "Review not found or you do not have permission to delete it".to_string(),
        ));
    }

    tracing::info!(review_id = %id, user_id = %auth.user_id, "Review deleted");

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}

/// Caller's own reviews, newest first
pub async fn my_reviews(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<ReviewListParams>,
) -> ApiResult<Json<ReviewListResponse<ReviewWithBox>>> {
    let page = params.pagination()?;
    let (reviews, total) = Review::list_for_user(&state.db, auth.user_id, page).await?;

    Ok(Json(ReviewListResponse {
        reviews,
        pagination: page.info(total),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rating() {
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
        assert!(check_rating(0).is_err());
        assert!(check_rating(6).is_err());
        assert!(check_rating(-3).is_err());
    }

    #[test]
    fn test_clean_comment() {
        assert_eq!(clean_comment(None), None);
        assert_eq!(clean_comment(Some("   ".to_string())), None);
        assert_eq!(clean_comment(Some(" Great value ".to_string())).as_deref(), Some("Great value"));
    }

    #[test]
    fn test_default_review_pagination() {
        let page = ReviewListParams::default().pagination().unwrap();
        assert_eq!(page, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_create_request_shape() {
        let id = Uuid::new_v4();
        let req: CreateReviewRequest = serde_json::from_value(serde_json::json!({
            "boxId": id,
            "rating": 4
        }))
        .unwrap();

        assert_eq!(req.box_id, id);
        assert_eq!(req.rating, 4);
        assert!(req.comment.is_none());
    }
}
