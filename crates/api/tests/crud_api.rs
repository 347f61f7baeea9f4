//! HTTP-level tests for the uniform CRUD and bulk contract.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete, delete_json, get, post_json, post_json_auth, put_json, seed_menu_item,
    seed_restaurant, seed_user,
};
use serde_json::{json, Value};
use sqlx::PgPool;

fn user_body(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "longitude": -74.08,
        "latitude": 4.61,
        "age": 33,
        "gender": "male",
    })
}

// ---------------------------------------------------------------------------
// Single-record operations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_get_update_delete_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app.clone(), "/api/v1/users", user_body("Mateo", "mateo@example.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body_json(response).await;
    let id = user["id"].as_i64().unwrap();
    assert_eq!(user["role"], "user");

    let response = get(app.clone(), &format!("/api/v1/users/{id}?fields=name,email")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let projected = body_json(response).await;
    assert_eq!(
        projected,
        json!({ "id": id, "name": "Mateo", "email": "mateo@example.com" })
    );

    let response = put_json(app.clone(), &format!("/api/v1/users/{id}"), json!({ "age": 44 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["age"], 44);

    let response = delete(app.clone(), &format!("/api/v1/users/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/users/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("User with id {id} not found"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_rules_are_validation_errors(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut body = user_body("Young", "young@example.com");
    body["age"] = json!(16);
    let response = post_json(app.clone(), "/api/v1/users", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get(app, "/api/v1/users?sort_by=password_hash").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_is_reported(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(app.clone(), "/api/v1/users", user_body("A", "dup@example.com")).await;

    let response = post_json(app, "/api/v1/users", user_body("B", "DUP@example.com")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DUPLICATE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_paginated_list_envelope(pool: PgPool) {
    for i in 0..12 {
        seed_restaurant(&pool, &format!("Place {i:02}"), &["pizza"]).await;
    }
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/restaurants?page=2&limit=5&sort_by=name&order=asc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 12);
    assert_eq!(json["totalPages"], 3);
    assert_eq!(json["page"], 2);
    let names: Vec<&str> = json["restaurants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Place 05", "Place 06", "Place 07", "Place 08", "Place 09"]);
}

// ---------------------------------------------------------------------------
// Bulk operations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_create_persists_all_but_duplicates(pool: PgPool) {
    seed_user(&pool, "Existing", "taken@example.com", "user").await;
    let app = common::build_test_app(pool);

    let items = json!([
        user_body("One", "one@example.com"),
        user_body("Taken", "taken@example.com"),
        user_body("Two", "two@example.com"),
        user_body("Again", "one@example.com"),
        { "name": "Broken" },
    ]);
    let response = post_json(app.clone(), "/api/v1/users/bulk", items).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["inserted_count"], 2);
    let errors = json["errors"].as_array().unwrap();
    let indexes: Vec<i64> = errors.iter().map(|e| e["index"].as_i64().unwrap()).collect();
    assert_eq!(indexes, [1, 3, 4]);
    assert_eq!(errors[0]["code"], "DUPLICATE");
    assert_eq!(errors[1]["code"], "DUPLICATE");
    assert_eq!(errors[2]["code"], "VALIDATION_ERROR");

    let all = body_json(get(app, "/api/v1/users/all").await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_create_with_only_failures_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/restaurants/bulk", json!([{ "name": "" }])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["inserted_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_update_counts_matched_and_modified(pool: PgPool) {
    let a = seed_restaurant(&pool, "Alpha", &["pizza"]).await;
    let b = seed_restaurant(&pool, "Beta", &["sushi"]).await;
    let app = common::build_test_app(pool);

    let items = json!([
        { "id": a.id, "changes": { "name": "Alpha Prime" } },
        { "id": b.id, "changes": { "name": "Beta" } },
        { "id": 999_999, "changes": { "name": "Ghost" } },
    ]);
    let response = put_json(app, "/api/v1/restaurants/bulk/update", items).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["matched_count"], 2);
    assert_eq!(json["modified_count"], 1);
    assert_eq!(json["errors"][0]["index"], 2);
    assert_eq!(json["errors"][0]["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_bulk_update_and_delete_by_email(pool: PgPool) {
    seed_user(&pool, "Eva", "eva@example.com", "user").await;
    seed_user(&pool, "Leo", "leo@example.com", "user").await;
    let app = common::build_test_app(pool);

    let items = json!([
        { "email": "eva@example.com", "changes": { "age": 50 } },
        { "email": "nobody@example.com", "changes": { "age": 50 } },
    ]);
    let json = body_json(put_json(app.clone(), "/api/v1/users/bulk/update", items).await).await;
    assert_eq!(json["matched_count"], 1);
    assert_eq!(json["modified_count"], 1);
    assert_eq!(json["errors"][0]["index"], 1);

    let response = delete_json(
        app.clone(),
        "/api/v1/users/bulk/delete",
        json!({ "emails": ["EVA@example.com", "leo@example.com"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted_count"], 2);

    let response = delete_json(app, "/api/v1/users/bulk/delete", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Cross-entity rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_menu_item_needs_existing_restaurant(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "restaurant_id": 424_242,
        "name": "Taco",
        "description": "Al pastor",
        "price": "3.50",
    });
    let response = post_json(app, "/api/v1/menu", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_for_same_restaurant_is_rejected(pool: PgPool) {
    let (user, _) = seed_user(&pool, "Critic", "critic@example.com", "user").await;
    let restaurant = seed_restaurant(&pool, "Bistro", &["french"]).await;
    let app = common::build_test_app(pool);

    let review = json!({
        "user_id": user.id,
        "restaurant_id": restaurant.id,
        "rating": 4.5,
        "comment": "Lovely",
    });
    let response = post_json(app.clone(), "/api/v1/reviews", review.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app.clone(), "/api/v1/reviews", review).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DUPLICATE");
    assert!(json["error"].as_str().unwrap().contains("already reviewed"));

    let all = body_json(get(app, "/api/v1/reviews/all").await).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_for_missing_user_is_404(pool: PgPool) {
    let restaurant = seed_restaurant(&pool, "Bistro", &["french"]).await;
    let app = common::build_test_app(pool);

    let review = json!({
        "user_id": 777_777,
        "restaurant_id": restaurant.id,
        "rating": 3.0,
        "comment": "Fine",
    });
    let response = post_json(app, "/api/v1/reviews", review).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_and_review_rules_report_their_messages(pool: PgPool) {
    let restaurant = seed_restaurant(&pool, "Bistro", &["french"]).await;
    let (critic, _) = seed_user(&pool, "Critic", "critic@example.com", "user").await;
    let app = common::build_test_app(pool);

    let mut body = user_body("Short", "short@example.com");
    body["password"] = json!("1234567");
    let response = post_json(app.clone(), "/api/v1/users", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Password must be at least 8 characters");

    let mut body = user_body("Lost", "lost@example.com");
    body["latitude"] = json!(91.0);
    let json = body_json(post_json(app.clone(), "/api/v1/users", body).await).await;
    assert_eq!(json["error"], "Latitude must be between -90 and 90, got 91");

    let response = put_json(
        app.clone(),
        &format!("/api/v1/users/{}", critic.id),
        json!({ "age": 71 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Age must be between 18 and 70, got 71");

    let review = json!({
        "user_id": critic.id,
        "restaurant_id": restaurant.id,
        "rating": 4.0,
        "comment": "x".repeat(501),
    });
    let response = post_json(app.clone(), "/api/v1/reviews", review).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Comment exceeds maximum length of 500 characters");

    let all = body_json(get(app, "/api/v1/reviews/all").await).await;
    assert!(all.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Promotions and payments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promotion_crud_merges_patch_over_stored_row(pool: PgPool) {
    let restaurant = seed_restaurant(&pool, "Diner", &["american"]).await;
    let burger = seed_menu_item(&pool, restaurant.id, "Burger", "12.50", &["beef"]).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "Burger week",
        "starts_at": "2026-01-01T00:00:00Z",
        "ends_at": "2026-01-08T00:00:00Z",
        "kind": "discount",
        "menu_item_ids": [burger.id],
        "discount": 0.25,
    });
    let response = post_json(app.clone(), "/api/v1/promotions", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let promotion = body_json(response).await;
    let id = promotion["id"].as_i64().unwrap();
    assert_eq!(promotion["menu_item_ids"], json!([burger.id]));

    // The stored kind is still `discount`, so the range applies to the patch.
    let uri = format!("/api/v1/promotions/{id}");
    let response = put_json(app.clone(), &uri, json!({ "discount": 0.8 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Discount must be between 0.1 and 0.5, got 0.8");

    let response = put_json(app.clone(), &uri, json!({ "kind": "2x1" })).await;
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = put_json(app.clone(), &uri, json!({ "ends_at": "2025-12-31T00:00:00Z" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Promotion end must not be before its start"
    );

    let response = put_json(app.clone(), &uri, json!({ "kind": "combo", "name": "Combo week" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["kind"], "combo");
    assert_eq!(updated["discount"], 0.25);

    let response = delete(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promotion_with_missing_menu_item_is_404(pool: PgPool) {
    let restaurant = seed_restaurant(&pool, "Diner", &["american"]).await;
    let burger = seed_menu_item(&pool, restaurant.id, "Burger", "12.50", &["beef"]).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "Two for one",
        "starts_at": "2026-01-01T00:00:00Z",
        "ends_at": "2026-01-08T00:00:00Z",
        "kind": "two_for_one",
        "menu_item_ids": [burger.id, 909_090],
    });
    let response = post_json(app.clone(), "/api/v1/promotions", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "MenuItem with id 909090 not found");

    let all = body_json(get(app, "/api/v1/promotions/all").await).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_crud_and_missing_references(pool: PgPool) {
    let (payer, token) = seed_user(&pool, "Paula", "paula@example.com", "user").await;
    let restaurant = seed_restaurant(&pool, "Diner", &["american"]).await;
    let burger = seed_menu_item(&pool, restaurant.id, "Burger", "12.50", &["beef"]).await;
    let app = common::build_test_app(pool);

    let order = json!({
        "restaurant_id": restaurant.id,
        "items": [{ "menu_item_id": burger.id, "quantity": 2 }],
    });
    let response = post_json_auth(app.clone(), "/api/v1/orders", order, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = body_json(response).await["id"].as_i64().unwrap();

    let payment = |user_id: i64, order_id: i64| {
        json!({ "user_id": user_id, "order_id": order_id, "amount": "25.00", "method": "cash" })
    };

    let response = post_json(app.clone(), "/api/v1/payments", payment(payer.id, 808_080)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Order with id 808080 not found");

    let response = post_json(app.clone(), "/api/v1/payments", payment(707_070, order_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User with id 707070 not found");

    let response = post_json(app.clone(), "/api/v1/payments", payment(payer.id, order_id)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "completed");

    let uri = format!("/api/v1/payments/{id}");
    let response = put_json(app.clone(), &uri, json!({ "method": "bitcoin" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = put_json(app.clone(), &uri, json!({ "status": "failed" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "failed");

    let all = body_json(get(app.clone(), "/api/v1/payments/all").await).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    assert_eq!(delete(app.clone(), &uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);
}
