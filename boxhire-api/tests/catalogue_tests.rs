mod common;

use axum::http::{Method, StatusCode};
use boxhire_shared::models::user::UserRole;
use common::{offline_router, send, Account, TestContext};
use serde_json::{json, Value};
use uuid::Uuid;

/// Tag placed in box names so a test can search for exactly its own boxes.
fn tag() -> String {
    format!("zz{}", Uuid::new_v4().simple())
}

async fn create_box(ctx: &TestContext, admin: &Account, name: &str, price: f64) -> Value {
    let (status, body) = ctx
        .post(
            "/api/boxes",
            Some(&admin.token),
            json!({
                "name": name,
                "category": "Gaming",
                "price": price,
                "description": "Test box",
                "features": ["One", "Two"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["box"].clone()
}

#[tokio::test]
async fn test_compare_rejects_bad_ids_without_database() {
    let router = offline_router();

    let (status, _) = send(&router, Method::GET, "/api/boxes/compare?ids=", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::GET, "/api/boxes/compare?ids=nope", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ids = (0..4).map(|_| Uuid::new_v4().to_string()).collect::<Vec<_>>().join(",");
    let (status, _) = send(&router, Method::GET, &format!("/api/boxes/compare?ids={ids}"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_rejects_non_numeric_price() {
    let router = offline_router();

    let (status, body) = send(&router, Method::GET, "/api/boxes?minPrice=cheap", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_box_writes_require_admin() {
    let Some(ctx) = TestContext::new().await else { return };
    let member = ctx.account(UserRole::Member).await;

    let (status, _) = ctx
        .post(
            "/api/boxes",
            Some(&member.token),
            json!({ "name": "Sneaky", "category": "Gaming", "price": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post("/api/boxes", None, json!({ "name": "Anon", "category": "Gaming", "price": 1.0 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_box_lifecycle() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.account(UserRole::Admin).await;
    let name = format!("Box {}", tag());

    let (status, _) = ctx
        .post(
            "/api/boxes",
            Some(&admin.token),
            json!({ "name": name, "category": "No Such Category", "price": 3.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/boxes",
            Some(&admin.token),
            json!({ "name": name, "category": "Gaming", "price": -1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let created = create_box(&ctx, &admin, &name, 4.5).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["category"], "Gaming");
    assert_eq!(created["reviewCount"], 0);
    assert_eq!(created["features"], json!(["One", "Two"]));

    let (status, body) = ctx
        .put(
            &format!("/api/boxes/{id}"),
            Some(&admin.token),
            json!({ "name": name, "category": "Music", "price": 6.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["box"]["category"], "Music");
    assert_eq!(body["box"]["price"], 6.0);

    let (status, _) = ctx.delete(&format!("/api/boxes/{id}"), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.get(&format!("/api/boxes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.delete(&format!("/api/boxes/{id}"), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_sorts_and_paginates() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.account(UserRole::Admin).await;
    let tag = tag();

    for (suffix, price) in [("a", 30.0), ("b", 10.0), ("c", 20.0)] {
        create_box(&ctx, &admin, &format!("{tag} {suffix}"), price).await;
    }

    let (status, body) = ctx
        .get(&format!("/api/boxes?search={tag}&sortBy=price&sortOrder=desc&limit=2"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"], json!({ "page": 1, "limit": 2, "total": 3, "pages": 2 }));
    let prices: Vec<f64> = body["boxes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![30.0, 20.0]);

    let (_, body) = ctx
        .get(&format!("/api/boxes?search={tag}&sortBy=price&sortOrder=desc&limit=2&page=2"), None)
        .await;
    assert_eq!(body["boxes"].as_array().unwrap().len(), 1);
    assert_eq!(body["boxes"][0]["price"], 10.0);

    let (_, body) = ctx
        .get(&format!("/api/boxes?search={}&minPrice=15&maxPrice=25", tag.to_uppercase()), None)
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["boxes"][0]["price"], 20.0);

    let (_, body) = ctx.get(&format!("/api/boxes?search={tag}&category=Music"), None).await;
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["pages"], 0);

    // Unknown sort fields fall back to name order.
    let (status, body) = ctx.get(&format!("/api/boxes?search={tag}&sortBy=bogus"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["boxes"][0]["name"].as_str().unwrap().ends_with(" a"));
}

#[tokio::test]
async fn test_compare_keeps_known_boxes() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.account(UserRole::Admin).await;
    let first = create_box(&ctx, &admin, &format!("Cmp {}", tag()), 1.0).await;
    let first_id = first["id"].as_str().unwrap();

    let uri = format!("/api/boxes/compare?ids={first_id},{},{first_id}", Uuid::new_v4());
    let (status, body) = ctx.get(&uri, None).await;

    assert_eq!(status, StatusCode::OK);
    let boxes = body["boxes"].as_array().unwrap();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0]["id"], first_id);
}

#[tokio::test]
async fn test_categories_are_seeded() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx.get("/api/boxes/categories/all", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert!(names.contains(&"Streaming"));
    assert!(names.contains(&"Gaming"));
}

#[tokio::test]
async fn test_review_rules() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.account(UserRole::Admin).await;
    let author = ctx.account(UserRole::Member).await;
    let stranger = ctx.account(UserRole::Member).await;
    let created = create_box(&ctx, &admin, &format!("Rev {}", tag()), 9.0).await;
    let box_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .post("/api/reviews", Some(&author.token), json!({ "boxId": box_id, "rating": 6 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/reviews",
            Some(&author.token),
            json!({ "boxId": Uuid::new_v4(), "rating": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .post(
            "/api/reviews",
            Some(&author.token),
            json!({ "boxId": box_id, "rating": 4, "comment": "Solid" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let review_id = body["review"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["review"]["user"]["name"], author.user.name);

    let (status, _) = ctx
        .post("/api/reviews", Some(&author.token), json!({ "boxId": box_id, "rating": 2 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post("/api/reviews", Some(&stranger.token), json!({ "boxId": box_id, "rating": 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = ctx.get(&format!("/api/boxes/{box_id}"), None).await;
    assert_eq!(body["box"]["reviewCount"], 2);
    assert_eq!(body["box"]["averageRating"], 3.0);

    let (status, body) = ctx.get(&format!("/api/reviews/box/{box_id}?sortBy=rating&sortOrder=asc"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["reviews"][0]["rating"], 2);

    let (status, _) = ctx
        .put(&format!("/api/reviews/{review_id}"), Some(&stranger.token), json!({ "rating": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.delete(&format!("/api/reviews/{review_id}"), Some(&stranger.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .put(
            &format!("/api/reviews/{review_id}"),
            Some(&author.token),
            json!({ "rating": 5, "comment": "Better now" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["review"]["rating"], 5);

    let (status, body) = ctx.get("/api/reviews/user/me", Some(&author.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(body["reviews"][0]["box"]["id"], box_id);

    let (status, _) = ctx.delete(&format!("/api/reviews/{review_id}"), Some(&author.token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_stats_are_public() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.account(UserRole::Admin).await;
    create_box(&ctx, &admin, &format!("Dash {}", tag()), 2.0).await;

    let (status, body) = ctx.get("/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["stats"]["totalBoxes"].as_i64().unwrap() >= 1);
    assert!(body["categoryDistribution"].is_array());
    assert!(body["topRatedBoxes"].as_array().unwrap().len() <= 5);

    let (status, _) = ctx.get("/api/dashboard/stats", Some("garbage")).await;
    assert_eq!(status, StatusCode::OK);
}
