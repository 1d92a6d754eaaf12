/// Box reviews
///
/// One review per (user, box), enforced by the `reviews_user_box_key` unique
/// constraint. Ratings are integers in `1..=5`, checked here and again by a
/// `CHECK` constraint in the schema.
///
/// Only the author may edit or delete a review; the `*_owned` functions put
/// the author in the `WHERE` clause so a foreign review looks exactly like a
/// missing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::pagination::{Pagination, SortOrder};

/// Lowest accepted rating
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating
pub const MAX_RATING: i32 = 5;

/// Returns true if `rating` lies in `MIN_RATING..=MAX_RATING`
pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Review row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub box_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public author details shown next to a review
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewAuthor {
    #[sqlx(rename = "user_name")]
    pub name: String,

    #[sqlx(rename = "user_avatar")]
    pub avatar: Option<String>,
}

/// Review as listed under a box
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,

    #[sqlx(flatten)]
    pub user: ReviewAuthor,
}

/// Box summary shown in "my reviews"
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedBox {
    #[sqlx(rename = "summary_box_id")]
    pub id: Uuid,

    #[sqlx(rename = "box_name")]
    pub name: String,

    #[sqlx(rename = "box_image")]
    pub image_url: Option<String>,

    #[sqlx(rename = "box_price")]
    pub price: f64,

    #[sqlx(rename = "box_category")]
    pub category: String,
}

/// Review as listed on the author's own page
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewWithBox {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,

    #[sqlx(flatten)]
    #[serde(rename = "box")]
    pub subscription_box: ReviewedBox,
}

/// Review shown in the dashboard feed
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentReview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,

    #[sqlx(flatten)]
    pub user: ReviewAuthor,

    pub box_name: String,
}

/// Sortable review columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSortField {
    #[default]
    CreatedAt,
    Rating,
}

impl ReviewSortField {
    fn column(&self) -> &'static str {
        match self {
            ReviewSortField::CreatedAt => "r.created_at",
            ReviewSortField::Rating => "r.rating",
        }
    }
}

/// Resolves `sortBy`/`sortOrder` for box reviews.
///
/// Defaults to newest first; unrecognised values also fall back to that.
pub fn parse_review_sort(
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> (ReviewSortField, SortOrder) {
    let field = match sort_by.map(str::trim) {
        None | Some("created_at") | Some("createdAt") => Some(ReviewSortField::CreatedAt),
        Some("rating") => Some(ReviewSortField::Rating),
        Some(_) => None,
    };
    let order = sort_order.map(SortOrder::parse).unwrap_or(Some(SortOrder::Desc));

    match (field, order) {
        (Some(field), Some(order)) => (field, order),
        _ => (ReviewSortField::CreatedAt, SortOrder::Desc),
    }
}

const REVIEW_COLUMNS: &str = "id, user_id, box_id, rating, comment, created_at, updated_at";

const REVIEW_WITH_USER: &str = r#"
    SELECT r.id, r.user_id, r.box_id, r.rating, r.comment, r.created_at, r.updated_at,
           u.name AS user_name, u.avatar_url AS user_avatar
    FROM reviews r
    JOIN users u ON u.id = r.user_id
"#;

impl Review {
    /// One page of reviews for a box plus the total review count.
    pub async fn list_for_box(
        pool: &PgPool,
        box_id: Uuid,
        sort: (ReviewSortField, SortOrder),
        page: Pagination,
    ) -> Result<(Vec<ReviewWithUser>, i64), sqlx::Error> {
        let (field, order) = sort;
        let sql = format!(
            "{REVIEW_WITH_USER} WHERE r.box_id = $1 ORDER BY {} {}, r.id LIMIT $2 OFFSET $3",
            field.column(),
            order.as_sql()
        );

        let reviews = sqlx::query_as::<_, ReviewWithUser>(&sql)
            .bind(box_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE box_id = $1")
            .bind(box_id)
            .fetch_one(pool)
            .await?;

        Ok((reviews, total))
    }

    /// Returns true if the user has already reviewed the box
    pub async fn exists_for(pool: &PgPool, user_id: Uuid, box_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE user_id = $1 AND box_id = $2)",
        )
        .bind(user_id)
        .bind(box_id)
        .fetch_one(pool)
        .await
    }

    /// Inserts a review.
    ///
    /// # Errors
    ///
    /// A second review for the same box fails with a unique violation on
    /// `reviews_user_box_key`.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        box_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO reviews (user_id, box_id, rating, comment) \
             VALUES ($1, $2, $3, $4) RETURNING {REVIEW_COLUMNS}"
        );

        sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .bind(box_id)
            .bind(rating)
            .bind(comment)
            .fetch_one(pool)
            .await
    }

    /// Review with its author details
    pub async fn find_with_user(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ReviewWithUser>, sqlx::Error> {
        let sql = format!("{REVIEW_WITH_USER} WHERE r.id = $1");

        sqlx::query_as::<_, ReviewWithUser>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Updates a review written by `user_id`. `None` if missing or foreign.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE reviews SET rating = $3, comment = $4, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {REVIEW_COLUMNS}"
        );

        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(rating)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a review written by `user_id`. False if missing or foreign.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest reviews across all boxes
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<RecentReview>, sqlx::Error> {
        sqlx::query_as::<_, RecentReview>(
            r#"
            SELECT r.id, r.user_id, r.box_id, r.rating, r.comment, r.created_at, r.updated_at,
                   u.name AS user_name, u.avatar_url AS user_avatar, sb.name AS box_name
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            JOIN subscription_boxes sb ON sb.id = r.box_id
            ORDER BY r.created_at DESC, r.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// The user's own reviews, newest first, with a summary of each box.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<(Vec<ReviewWithBox>, i64), sqlx::Error> {
        let reviews = sqlx::query_as::<_, ReviewWithBox>(
            r#"
            SELECT r.id, r.user_id, r.box_id, r.rating, r.comment, r.created_at, r.updated_at,
                   sb.id AS summary_box_id, sb.name AS box_name, sb.image_url AS box_image,
                   sb.price AS box_price, c.name AS box_category
            FROM reviews r
            JOIN subscription_boxes sb ON sb.id = r.box_id
            JOIN categories c ON c.id = sb.category_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC, r.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((reviews, total))
    }
}
