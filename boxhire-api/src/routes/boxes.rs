/// Subscription box catalogue endpoints
///
/// # Endpoints
///
/// - `GET    /api/boxes` - Filtered, sorted, paginated listing
/// - `GET    /api/boxes/:id` - One box with rating aggregates
/// - `GET    /api/boxes/categories/all` - Categories by name
/// - `GET    /api/boxes/compare?ids=a,b,c` - Up to three boxes side by side
/// - `POST   /api/boxes` - Create (admin)
/// - `PUT    /api/boxes/:id` - Replace (admin)
/// - `DELETE /api/boxes/:id` - Delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    validation::not_blank,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use boxhire_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        category::Category,
        subscription_box::{parse_box_sort, BoxInput, BoxListQuery, BoxWithRating, SubscriptionBox},
    },
    pagination::{PageInfo, Pagination},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Default page size for the box listing
pub const DEFAULT_BOX_LIMIT: i64 = 20;

/// Most boxes the comparison view accepts
pub const MAX_COMPARE: usize = 3;

/// Raw listing query. Numbers arrive as strings so that an empty value
/// (`?minPrice=`) means "no filter" instead of a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBoxesParams {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    /// Comma separated box ids
    pub ids: Option<String>,
}

/// Create/replace body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoxRequest {
    #[validate(length(max = 255), custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    /// Category name
    #[validate(custom(function = "not_blank", message = "Category is required"))]
    pub category: String,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    pub customization: Option<String>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BoxListResponse {
    pub boxes: Vec<BoxWithRating>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct BoxResponse {
    #[serde(rename = "box")]
    pub subscription_box: BoxWithRating,
}

#[derive(Debug, Serialize)]
pub struct BoxesResponse {
    pub boxes: Vec<BoxWithRating>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct BoxMutationResponse {
    pub message: String,

    #[serde(rename = "box")]
    pub subscription_box: BoxWithRating,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Parses an optional query value. Blank means absent.
pub(crate) fn parse_param<T: FromStr>(field: &str, raw: Option<&str>) -> ApiResult<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid_field(field, format!("{field} must be a number"))),
    }
}

impl ListBoxesParams {
    /// Validated listing query
    pub fn into_query(self) -> ApiResult<BoxListQuery> {
        let min_price = parse_param::<f64>("minPrice", self.min_price.as_deref())?;
        let max_price = parse_param::<f64>("maxPrice", self.max_price.as_deref())?;
        let min_rating = parse_param::<f64>("minRating", self.min_rating.as_deref())?;
        let page = parse_param::<i64>("page", self.page.as_deref())?;
        let limit = parse_param::<i64>("limit", self.limit.as_deref())?;

        let (sort_by, sort_order) =
            parse_box_sort(self.sort_by.as_deref(), self.sort_order.as_deref());

        let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(BoxListQuery {
            category: non_blank(self.category),
            min_price,
            max_price,
            min_rating,
            search: non_blank(self.search),
            sort_by,
            sort_order,
            pagination: Pagination::new(page, limit, DEFAULT_BOX_LIMIT),
        })
    }
}

/// Parses `ids=a,b,c` for the comparison view.
pub fn parse_compare_ids(raw: Option<&str>) -> ApiResult<Vec<Uuid>> {
    let mut ids = Vec::new();

    for part in raw.unwrap_or_default().split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(part)
            .map_err(|_| ApiError::invalid_field("ids", format!("Invalid box id: {part}")))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(ApiError::invalid_field("ids", "At least one box id is required"));
    }
    if ids.len() > MAX_COMPARE {
        return Err(ApiError::invalid_field(
            "ids",
            format!("At most {MAX_COMPARE} boxes can be compared"),
        ));
    }

    Ok(ids)
}

/// List boxes
///
/// # Endpoint
///
/// ```text
/// GET /api/boxes?category=Music&minPrice=5&maxPrice=12&minRating=3
///               &search=premium&sortBy=price&sortOrder=DESC&page=1&limit=20
/// ```
///
/// # Response
///
/// ```json
/// { "boxes": [ ... ], "pagination": { "page": 1, "limit": 20, "total": 3, "pages": 1 } }
/// ```
pub async fn list_boxes(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListBoxesParams>,
) -> ApiResult<Json<BoxListResponse>> {
    let query = params.into_query()?;
    let (boxes, total) = SubscriptionBox::list(&state.db, &query).await?;

    Ok(Json(BoxListResponse {
        boxes,
        pagination: query.pagination.info(total),
    }))
}

/// Get one box
///
/// # Errors
///
/// - 404 if the box does not exist
pub async fn get_box(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<BoxResponse>> {
    let subscription_box = SubscriptionBox::find_with_rating(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription box not found".to_string()))?;

    Ok(Json(BoxResponse { subscription_box }))
}

/// All categories ordered by name
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = Category::list(&state.db).await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// Compare up to three boxes, in the order requested. Unknown ids are skipped.
pub async fn compare_boxes(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CompareParams>,
) -> ApiResult<Json<BoxesResponse>> {
    let ids = parse_compare_ids(params.ids.as_deref())?;
    let boxes = SubscriptionBox::find_many(&state.db, &ids).await?;

    Ok(Json(BoxesResponse { boxes }))
}

async fn box_input(state: &AppState, req: BoxRequest) -> ApiResult<BoxInput> {
    req.validate()?;

    let category = Category::find_by_name(&state.db, req.category.trim())
        .await?
        .ok_or_else(|| ApiError::invalid_field("category", format!("Unknown category: {}", req.category)))?;

    Ok(BoxInput {
        name: req.name.trim().to_string(),
        category_id: category.id,
        price: req.price,
        customization: req.customization,
        image_url: req.image_url,
        description: req.description,
        features: req
            .features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
    })
}

async fn load_with_rating(state: &AppState, id: Uuid) -> ApiResult<BoxWithRating> {
    SubscriptionBox::find_with_rating(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription box not found".to_string()))
}

/// Create a box (admin)
///
/// # Errors
///
/// - 403 for non-admin callers
/// - 400 on validation failure or an unknown category
pub async fn create_box(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<BoxRequest>,
) -> ApiResult<(StatusCode, Json<BoxMutationResponse>)> {
    require_admin(&auth)?;

    let input = box_input(&state, req).await?;
    let created = SubscriptionBox::create(&state.db, input).await?;

    tracing::info!(box_id = %created.id, admin_id = %auth.user_id, "Box created");

    Ok((
        StatusCode::CREATED,
        Json(BoxMutationResponse {
            message: "Subscription box created successfully".to_string(),
            subscription_box: load_with_rating(&state, created.id).await?,
        }),
    ))
}

/// Replace a box (admin)
pub async fn update_box(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<BoxRequest>,
) -> ApiResult<Json<BoxMutationResponse>> {
    require_admin(&auth)?;

    let input = box_input(&state, req).await?;
    SubscriptionBox::update(&state.db, id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription box not found".to_string()))?;

    tracing::info!(box_id = %id, admin_id = %auth.user_id, "Box updated");

    Ok(Json(BoxMutationResponse {
        message: "Subscription box updated successfully".to_string(),
        subscription_box: load_with_rating(&state, id).await?,
    }))
}

/// Delete a box and its reviews (admin)
pub async fn delete_box(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;

    if !SubscriptionBox::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Subscription box not found".to_string()));
    }

    tracing::info!(box_id = %id, admin_id = %auth.user_id, "Box deleted");

    Ok(Json(MessageResponse {
        message: "Subscription box deleted successfully".to_string(),
    }))
}
