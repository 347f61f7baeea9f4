//! Integration tests for the repository layer against a real database.

use assert_matches::assert_matches;
use comanda_core::order_pricing::{price_items, RequestedItem};
use comanda_core::order_status::{plan_transition, OrderStatus};
use comanda_core::query_spec::{Filter, FilterValue, QuerySpec, SortDirection};
use comanda_core::write_check::WriteCheck;
use comanda_db::models::menu_item::{CreateMenuItem, MENU_ITEM_FIELDS};
use comanda_db::models::restaurant::CreateRestaurant;
use comanda_db::models::review::CreateReview;
use comanda_db::models::user::{CreateUser, UpdateUser, USER_FIELDS};
use comanda_db::repositories::{
    MenuItemRepo, OrderRepo, PromotionRepo, RestaurantRepo, ReviewRepo, UserRepo,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(name: &str, email: &str, age: i32) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        longitude: -74.08,
        latitude: 4.61,
        registered_at: None,
        age,
        gender: "female".to_string(),
        password: None,
        address: None,
        profile: None,
    }
}

fn new_restaurant(name: &str) -> CreateRestaurant {
    CreateRestaurant {
        name: name.to_string(),
        address: "Calle 10 # 5-20".to_string(),
        longitude: -74.07,
        latitude: 4.60,
        categories: vec!["mexican".to_string()],
    }
}

fn new_menu_item(restaurant_id: i64, name: &str, price: &str, tags: &[&str]) -> CreateMenuItem {
    CreateMenuItem {
        restaurant_id,
        name: name.to_string(),
        description: format!("{name} of the house"),
        price: price.parse().unwrap(),
        available: None,
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_email_is_normalised_and_unique(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana", "Ana@Example.com", 30), None)
        .await
        .unwrap();
    assert_eq!(user.email, "ana@example.com");
    assert_eq!(user.role, "user");
    assert_eq!(user.profile, serde_json::json!({}));

    let check = UserRepo::check_create(&pool, &new_user("Other", "ANA@example.com", 40))
        .await
        .unwrap();
    assert_matches!(check, WriteCheck::Conflict(_));

    let check = UserRepo::check_create(&pool, &new_user("Teen", "teen@example.com", 15))
        .await
        .unwrap();
    assert_matches!(check, WriteCheck::Invalid(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_update_email_conflict_excludes_self(pool: PgPool) {
    let ana = UserRepo::create(&pool, &new_user("Ana", "ana@example.com", 30), None)
        .await
        .unwrap();
    UserRepo::create(&pool, &new_user("Bea", "bea@example.com", 31), None)
        .await
        .unwrap();

    let same = UpdateUser {
        email: Some("ana@example.com".into()),
        ..Default::default()
    };
    assert!(UserRepo::check_update(&pool, ana.id, &same).await.unwrap().is_ok());

    let taken = UpdateUser {
        email: Some("BEA@example.com".into()),
        ..Default::default()
    };
    assert_matches!(
        UserRepo::check_update(&pool, ana.id, &taken).await.unwrap(),
        WriteCheck::Conflict(_)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_list_filters_sorts_and_paginates(pool: PgPool) {
    for (i, age) in [25, 30, 30, 45].iter().enumerate() {
        UserRepo::create(
            &pool,
            &new_user(&format!("User {i}"), &format!("u{i}@example.com"), *age),
            None,
        )
        .await
        .unwrap();
    }

    let spec = QuerySpec::builder(&USER_FIELDS)
        .filter(Filter::Eq { column: "age", value: FilterValue::Int(30) })
        .sort(Some("name"), None)
        .paginate(Some(1), Some(1))
        .build()
        .unwrap();
    assert_eq!(spec.sort.direction, SortDirection::Asc);

    let page = UserRepo::list(&pool, &spec).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "User 1");

    let spec = QuerySpec::builder(&USER_FIELDS)
        .filter(Filter::Contains { column: "name", value: "user 3".into() })
        .build()
        .unwrap();
    let page = UserRepo::list(&pool, &spec).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].age, 45);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_bulk_delete_by_ids_and_emails(pool: PgPool) {
    let a = UserRepo::create(&pool, &new_user("A", "a@example.com", 20), None)
        .await
        .unwrap();
    UserRepo::create(&pool, &new_user("B", "b@example.com", 20), None)
        .await
        .unwrap();
    UserRepo::create(&pool, &new_user("C", "c@example.com", 20), None)
        .await
        .unwrap();

    let deleted = UserRepo::delete_many(&pool, &[a.id], &["B@example.com".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(UserRepo::list_all(&pool).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_merge_profile_reports_real_changes_only(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana", "ana@example.com", 30), None)
        .await
        .unwrap();
    let updates = serde_json::json!({"favorite": "tacos"});

    assert_eq!(UserRepo::merge_profile(&pool, user.id, &updates).await.unwrap(), 1);
    assert_eq!(UserRepo::merge_profile(&pool, user.id, &updates).await.unwrap(), 0);

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.profile["favorite"], "tacos");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ensure_admin_promotes_existing_account(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana", "ana@example.com", 30), None)
        .await
        .unwrap();
    let admin = UserRepo::ensure_admin(&pool, "ANA@example.com", "hash")
        .await
        .unwrap();
    assert_eq!(admin.id, user.id);
    assert_eq!(admin.role, "admin");
    assert_eq!(admin.password_hash.as_deref(), Some("hash"));
}

// ---------------------------------------------------------------------------
// Restaurants and menu items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restaurant_name_address_conflict(pool: PgPool) {
    RestaurantRepo::create(&pool, &new_restaurant("El Fogón"))
        .await
        .unwrap();
    let check = RestaurantRepo::check_create(&pool, &new_restaurant("El Fogón"))
        .await
        .unwrap();
    assert_matches!(check, WriteCheck::Conflict(_));

    let mut no_categories = new_restaurant("Vacío");
    no_categories.categories.clear();
    let check = RestaurantRepo::check_create(&pool, &no_categories).await.unwrap();
    assert_matches!(check, WriteCheck::Invalid(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_menu_tag_array_helpers(pool: PgPool) {
    let r = RestaurantRepo::create(&pool, &new_restaurant("Tacos")).await.unwrap();
    let item = MenuItemRepo::create(&pool, &new_menu_item(r.id, "Al pastor", "3.50", &["spicy", "pork", "spicy"]))
        .await
        .unwrap();
    assert!(item.available);

    let item = MenuItemRepo::push_tag(&pool, item.id, "classic").await.unwrap().unwrap();
    assert_eq!(item.tags, ["spicy", "pork", "spicy", "classic"]);

    let item = MenuItemRepo::pull_tag(&pool, item.id, "spicy").await.unwrap().unwrap();
    assert_eq!(item.tags, ["pork", "classic"]);

    let item = MenuItemRepo::pop_first_tag(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(item.tags, ["classic"]);

    let item = MenuItemRepo::pull_all_tags(&pool, item.id, &["classic".to_string(), "x".to_string()])
        .await
        .unwrap()
        .unwrap();
    assert!(item.tags.is_empty());

    let item = MenuItemRepo::pop_first_tag(&pool, item.id).await.unwrap().unwrap();
    assert!(item.tags.is_empty());

    assert!(MenuItemRepo::push_tag(&pool, 999_999, "x").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_menu_list_by_tag_and_missing_ids(pool: PgPool) {
    let r = RestaurantRepo::create(&pool, &new_restaurant("Tacos")).await.unwrap();
    let a = MenuItemRepo::create(&pool, &new_menu_item(r.id, "A", "1.00", &["vegan"]))
        .await
        .unwrap();
    MenuItemRepo::create(&pool, &new_menu_item(r.id, "B", "2.00", &["meat"]))
        .await
        .unwrap();

    let spec = QuerySpec::builder(&MENU_ITEM_FIELDS)
        .filter(Filter::HasElement { column: "tags", value: "vegan".into() })
        .build()
        .unwrap();
    let page = MenuItemRepo::list(&pool, &spec).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, a.id);

    let missing = MenuItemRepo::missing_ids(&pool, &[a.id, 424_242, 7_777_777]).await.unwrap();
    assert_eq!(missing, vec![424_242, 7_777_777]);

    let check = MenuItemRepo::check_create(&pool, &new_menu_item(r.id, "A", "1.00", &[]))
        .await
        .unwrap();
    assert_matches!(check, WriteCheck::Conflict(_));
    let check = MenuItemRepo::check_create(&pool, &new_menu_item(r.id, "C", "-1.00", &[]))
        .await
        .unwrap();
    assert_matches!(check, WriteCheck::Invalid(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promotion_add_menu_item_is_idempotent(pool: PgPool) {
    use comanda_db::models::promotion::CreatePromotion;

    let now = chrono::Utc::now();
    let promo = PromotionRepo::create(
        &pool,
        &CreatePromotion {
            name: "Martes 2x1".into(),
            starts_at: now,
            ends_at: now + chrono::Duration::days(7),
            kind: "two_for_one".into(),
            menu_item_ids: vec![],
            discount: None,
        },
    )
    .await
    .unwrap();

    PromotionRepo::add_menu_item(&pool, promo.id, 5).await.unwrap();
    let promo = PromotionRepo::add_menu_item(&pool, promo.id, 5).await.unwrap().unwrap();
    assert_eq!(promo.menu_item_ids, vec![5]);
}

// ---------------------------------------------------------------------------
// Orders and reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_status_update_is_conditional(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana", "ana@example.com", 30), None)
        .await
        .unwrap();
    let r = RestaurantRepo::create(&pool, &new_restaurant("Tacos")).await.unwrap();
    let item = MenuItemRepo::create(&pool, &new_menu_item(r.id, "A", "4.00", &[]))
        .await
        .unwrap();

    let requested = [RequestedItem {
        menu_item_id: item.id,
        quantity: 3,
        special_instructions: None,
    }];
    let prices = MenuItemRepo::find_prices(&pool, &[item.id]).await.unwrap();
    let priced = price_items(r.id, &requested, &prices).unwrap();
    let order = OrderRepo::create(&pool, user.id, r.id, &priced).await.unwrap();
    assert_eq!(order.status, "pending");
    assert_eq!(order.total, Decimal::new(1200, 2));
    assert_eq!(order.items.0.len(), 1);

    let change = plan_transition(OrderStatus::Pending, OrderStatus::Preparing).unwrap();
    let order = OrderRepo::apply_status(&pool, order.id, OrderStatus::Pending, &change)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, "preparing");
    assert!(order.preparation_started_at.is_some());
    assert!(order.delivered_at.is_none());

    // Stale `from` status matches nothing.
    let stale = OrderRepo::apply_status(&pool, order.id, OrderStatus::Pending, &change)
        .await
        .unwrap();
    assert!(stale.is_none());

    // Items can no longer be replaced once the order left `pending`.
    assert!(OrderRepo::replace_items(&pool, order.id, &priced).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_combined_order_update_writes_items_and_status_together(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana", "ana@example.com", 30), None)
        .await
        .unwrap();
    let r = RestaurantRepo::create(&pool, &new_restaurant("Tacos")).await.unwrap();
    let item = MenuItemRepo::create(&pool, &new_menu_item(r.id, "A", "4.00", &[]))
        .await
        .unwrap();
    let prices = MenuItemRepo::find_prices(&pool, &[item.id]).await.unwrap();
    let line = |quantity| RequestedItem {
        menu_item_id: item.id,
        quantity,
        special_instructions: None,
    };
    let priced = price_items(r.id, &[line(1)], &prices).unwrap();
    let order = OrderRepo::create(&pool, user.id, r.id, &priced).await.unwrap();

    let repriced = price_items(r.id, &[line(5)], &prices).unwrap();
    let change = plan_transition(OrderStatus::Pending, OrderStatus::Confirmed).unwrap();
    let updated =
        OrderRepo::apply_update(&pool, order.id, OrderStatus::Pending, Some(&repriced), Some(&change))
            .await
            .unwrap()
            .unwrap();
    assert_eq!(updated.status, "confirmed");
    assert_eq!(updated.total, Decimal::new(2000, 2));

    // A stale guard writes neither part.
    let again = price_items(r.id, &[line(2)], &prices).unwrap();
    let to_ready = plan_transition(OrderStatus::Pending, OrderStatus::Ready).unwrap();
    let stale =
        OrderRepo::apply_update(&pool, order.id, OrderStatus::Pending, Some(&again), Some(&to_ready))
            .await
            .unwrap();
    assert!(stale.is_none());

    let stored = OrderRepo::find_by_id(&pool, order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "confirmed");
    assert_eq!(stored.total, Decimal::new(2000, 2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_is_a_conflict_and_rating_is_rounded(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("Ana", "ana@example.com", 30), None)
        .await
        .unwrap();
    let r = RestaurantRepo::create(&pool, &new_restaurant("Tacos")).await.unwrap();

    let input = CreateReview {
        user_id: user.id,
        restaurant_id: r.id,
        rating: 4.26,
        comment: "Muy rico".into(),
    };
    assert!(ReviewRepo::check_create(&pool, &input).await.unwrap().is_ok());
    let review = ReviewRepo::create(&pool, &input).await.unwrap();
    assert_eq!(review.rating, 4.3);

    assert_matches!(
        ReviewRepo::check_create(&pool, &input).await.unwrap(),
        WriteCheck::Conflict(_)
    );
}
