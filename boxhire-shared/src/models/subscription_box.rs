/// Subscription box catalogue
///
/// A box is one subscription service (Netflix, Spotify Premium, ...) with a
/// price, a category and a list of feature strings. Average rating and review
/// count are never stored; they are aggregated from `reviews` on every read.
///
/// # Listing
///
/// [`SubscriptionBox::list`] assembles its SQL with [`sqlx::QueryBuilder`]
/// from a [`BoxListQuery`]. Every user-supplied value is bound as a parameter;
/// only whitelisted column names and directions are spliced into the text.
///
/// ```no_run
/// use boxhire_shared::models::subscription_box::{BoxListQuery, BoxSortField, SubscriptionBox};
/// use boxhire_shared::pagination::{Pagination, SortOrder};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let query = BoxListQuery {
///     category: Some("Music".to_string()),
///     max_price: Some(12.0),
///     sort_by: BoxSortField::Price,
///     sort_order: SortOrder::Desc,
///     pagination: Pagination::new(Some(1), Some(10), 20),
///     ..Default::default()
/// };
///
/// let (boxes, total) = SubscriptionBox::list(&pool, &query).await?;
/// println!("{} of {} boxes", boxes.len(), total);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pagination::{Pagination, SortOrder};

/// Stored box row, without aggregates
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBox {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub price: f64,
    pub customization: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub features: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Box joined with its category name and review aggregates
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BoxWithRating {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,

    /// Category name
    #[sqlx(rename = "category_name")]
    pub category: String,

    pub price: f64,
    pub customization: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub features: Json<Vec<String>>,

    /// Mean review rating, 0 when the box has no reviews
    pub average_rating: f64,

    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin input for creating or replacing a box
#[derive(Debug, Clone)]
pub struct BoxInput {
    pub name: String,
    pub category_id: Uuid,
    pub price: f64,
    pub customization: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
}

/// Sortable listing columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSortField {
    #[default]
    Name,
    Price,
    AverageRating,
    CreatedAt,
}

impl BoxSortField {
    /// Parses the `sortBy` query value. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "name" => Some(BoxSortField::Name),
            "price" => Some(BoxSortField::Price),
            "average_rating" | "averageRating" | "rating" => Some(BoxSortField::AverageRating),
            "created_at" | "createdAt" => Some(BoxSortField::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            BoxSortField::Name => "sb.name",
            BoxSortField::Price => "sb.price",
            BoxSortField::AverageRating => "average_rating",
            BoxSortField::CreatedAt => "sb.created_at",
        }
    }
}

/// Resolves `sortBy`/`sortOrder` together.
///
/// If either value is present but unrecognised, both fall back to `name ASC`.
pub fn parse_box_sort(sort_by: Option<&str>, sort_order: Option<&str>) -> (BoxSortField, SortOrder) {
    let field = sort_by.map(BoxSortField::parse).unwrap_or(Some(BoxSortField::Name));
    let order = sort_order.map(SortOrder::parse).unwrap_or(Some(SortOrder::Asc));

    match (field, order) {
        (Some(field), Some(order)) => (field, order),
        _ => (BoxSortField::Name, SortOrder::Asc),
    }
}

/// Filters, ordering and paging for [`SubscriptionBox::list`]
#[derive(Debug, Clone)]
pub struct BoxListQuery {
    /// Category name; `None` or `"All"` disables the filter
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,

    /// Minimum average rating
    pub min_rating: Option<f64>,

    /// Case-insensitive substring of name or description
    pub search: Option<String>,

    pub sort_by: BoxSortField,
    pub sort_order: SortOrder,
    pub pagination: Pagination,
}

impl Default for BoxListQuery {
    fn default() -> Self {
        Self {
            category: None,
            min_price: None,
            max_price: None,
            min_rating: None,
            search: None,
            sort_by: BoxSortField::Name,
            sort_order: SortOrder::Asc,
            pagination: Pagination::new(None, None, 20),
        }
    }
}

/// Escapes `\`, `%` and `_` so user input matches literally inside `LIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

const BOX_SELECT: &str = r#"
    SELECT
        sb.id, sb.name, sb.category_id, c.name AS category_name, sb.price,
        sb.customization, sb.image_url, sb.description, sb.features,
        COALESCE(AVG(r.rating), 0)::FLOAT8 AS average_rating,
        COUNT(r.id) AS review_count,
        sb.created_at, sb.updated_at
    FROM subscription_boxes sb
    JOIN categories c ON c.id = sb.category_id
    LEFT JOIN reviews r ON r.box_id = sb.id
"#;

const BOX_COLUMNS: &str = "id, name, category_id, price, customization, image_url, \
                           description, features, created_at, updated_at";

/// Pushes the grouped, filtered select shared by the page and count queries.
fn push_filtered_select(qb: &mut QueryBuilder<'_, Postgres>, query: &BoxListQuery) {
    qb.push(BOX_SELECT);
    qb.push(" WHERE 1=1");

    if let Some(category) = query.category.as_deref().map(str::trim) {
        if !category.is_empty() && category != "All" {
            qb.push(" AND c.name = ").push_bind(category.to_string());
        }
    }

    if let Some(min) = query.min_price {
        qb.push(" AND sb.price >= ").push_bind(min);
    }

    if let Some(max) = query.max_price {
        qb.push(" AND sb.price <= ").push_bind(max);
    }

    if let Some(search) = query.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (sb.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR sb.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    qb.push(" GROUP BY sb.id, c.name");

    if let Some(min_rating) = query.min_rating {
        qb.push(" HAVING COALESCE(AVG(r.rating), 0) >= ")
            .push_bind(min_rating);
    }
}

/// Builds the page query for a listing.
pub fn build_list_query(query: &BoxListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    push_filtered_select(&mut qb, query);

    qb.push(" ORDER BY ")
        .push(query.sort_by.column())
        .push(" ")
        .push(query.sort_order.as_sql())
        .push(", sb.id");

    qb.push(" LIMIT ")
        .push_bind(query.pagination.limit)
        .push(" OFFSET ")
        .push_bind(query.pagination.offset());

    qb
}

/// Builds the total-count query for a listing.
///
/// Wraps the grouped select so the rating filter applies to the count too.
pub fn build_count_query(query: &BoxListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM (");
    push_filtered_select(&mut qb, query);
    qb.push(") AS filtered");
    qb
}

impl SubscriptionBox {
    /// One page of boxes plus the total number matching the filters.
    pub async fn list(
        pool: &PgPool,
        query: &BoxListQuery,
    ) -> Result<(Vec<BoxWithRating>, i64), sqlx::Error> {
        let mut page = build_list_query(query);
        let boxes = page
            .build_query_as::<BoxWithRating>()
            .fetch_all(pool)
            .await?;

        let mut count = build_count_query(query);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        Ok((boxes, total))
    }

    /// Single box with aggregates
    pub async fn find_with_rating(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<BoxWithRating>, sqlx::Error> {
        let sql = format!("{BOX_SELECT} WHERE sb.id = $1 GROUP BY sb.id, c.name");

        sqlx::query_as::<_, BoxWithRating>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Boxes for the comparison view, in the order the ids were given.
    ///
    /// Unknown ids are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<BoxWithRating>, sqlx::Error> {
        let sql = format!("{BOX_SELECT} WHERE sb.id = ANY($1) GROUP BY sb.id, c.name");

        let mut boxes = sqlx::query_as::<_, BoxWithRating>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        boxes.sort_by_key(|b| ids.iter().position(|id| *id == b.id));
        Ok(boxes)
    }

    /// Highest rated boxes; ties broken by review count.
    pub async fn top_rated(pool: &PgPool, limit: i64) -> Result<Vec<BoxWithRating>, sqlx::Error> {
        let sql = format!(
            "{BOX_SELECT} GROUP BY sb.id, c.name \
             ORDER BY average_rating DESC, review_count DESC, sb.name LIMIT $1"
        );

        sqlx::query_as::<_, BoxWithRating>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Returns true if a box with this id exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM subscription_boxes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, data: BoxInput) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO subscription_boxes \
                 (name, category_id, price, customization, image_url, description, features) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {BOX_COLUMNS}"
        );

        sqlx::query_as::<_, SubscriptionBox>(&sql)
            .bind(data.name)
            .bind(data.category_id)
            .bind(data.price)
            .bind(data.customization)
            .bind(data.image_url)
            .bind(data.description)
            .bind(Json(data.features))
            .fetch_one(pool)
            .await
    }

    /// Replaces every editable field. Returns `None` if the box is gone.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: BoxInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE subscription_boxes SET \
                 name = $2, category_id = $3, price = $4, customization = $5, \
                 image_url = $6, description = $7, features = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BOX_COLUMNS}"
        );

        sqlx::query_as::<_, SubscriptionBox>(&sql)
            .bind(id)
            .bind(data.name)
            .bind(data.category_id)
            .bind(data.price)
            .bind(data.customization)
            .bind(data.image_url)
            .bind(data.description)
            .bind(Json(data.features))
            .fetch_optional(pool)
            .await
    }

    /// Deletes a box and its reviews
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscription_boxes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_sort_parse_fallback() {
        assert_eq!(parse_box_sort(None, None), (BoxSortField::Name, SortOrder::Asc));
        assert_eq!(
            parse_box_sort(Some("price"), Some("desc")),
            (BoxSortField::Price, SortOrder::Desc)
        );
        assert_eq!(
            parse_box_sort(Some("average_rating"), None),
            (BoxSortField::AverageRating, SortOrder::Asc)
        );
        // An unknown direction resets the column as well
        assert_eq!(
            parse_box_sort(Some("price"), Some("up")),
            (BoxSortField::Name, SortOrder::Asc)
        );
        assert_eq!(
            parse_box_sort(Some("password_hash"), Some("DESC")),
            (BoxSortField::Name, SortOrder::Asc)
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }

    #[test]
    fn test_list_query_without_filters() {
        let qb = build_list_query(&BoxListQuery::default());
        let sql = normalize(qb.sql());

        assert!(sql.contains("WHERE 1=1 GROUP BY sb.id, c.name ORDER BY sb.name ASC, sb.id"));
        assert!(sql.ends_with("LIMIT $1 OFFSET $2"));
        assert!(!sql.contains("HAVING"));
    }

    #[test]
    fn test_list_query_all_filters() {
        let query = BoxListQuery {
            category: Some("Music".to_string()),
            min_price: Some(5.0),
            max_price: Some(20.0),
            min_rating: Some(3.5),
            search: Some("premium".to_string()),
            sort_by: BoxSortField::AverageRating,
            sort_order: SortOrder::Desc,
            pagination: Pagination::new(Some(2), Some(10), 20),
        };

        let sql = normalize(build_list_query(&query).sql());

        assert!(sql.contains("AND c.name = $1"));
        assert!(sql.contains("AND sb.price >= $2"));
        assert!(sql.contains("AND sb.price <= $3"));
        assert!(sql.contains("AND (sb.name ILIKE $4 OR sb.description ILIKE $5)"));
        assert!(sql.contains("HAVING COALESCE(AVG(r.rating), 0) >= $6"));
        assert!(sql.contains("ORDER BY average_rating DESC, sb.id"));
        assert!(sql.ends_with("LIMIT $7 OFFSET $8"));
    }

    #[test]
    fn test_all_category_is_not_a_filter() {
        let query = BoxListQuery {
            category: Some("All".to_string()),
            search: Some("   ".to_string()),
            ..Default::default()
        };

        let sql = normalize(build_list_query(&query).sql());
        assert!(!sql.contains("c.name ="));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn test_count_query_keeps_rating_filter() {
        let query = BoxListQuery {
            min_rating: Some(4.0),
            ..Default::default()
        };

        let sql = normalize(build_count_query(&query).sql());
        assert!(sql.starts_with("SELECT COUNT(*) FROM ("));
        assert!(sql.contains("HAVING COALESCE(AVG(r.rating), 0) >= $1"));
        assert!(sql.ends_with(") AS filtered"));
        assert!(!sql.contains("LIMIT"));
    }
}
