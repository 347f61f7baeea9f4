//! Integration tests for the reporting catalog.

use comanda_core::order_pricing::{price_items, RequestedItem};
use comanda_core::order_status::{plan_transition, OrderStatus};
use comanda_db::models::menu_item::CreateMenuItem;
use comanda_db::models::restaurant::CreateRestaurant;
use comanda_db::models::user::CreateUser;
use comanda_db::repositories::{AggregationRepo, MenuItemRepo, OrderRepo, RestaurantRepo, UserRepo};
use rust_decimal::Decimal;
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, email: &str, gender: &str) -> i64 {
    let input = CreateUser {
        name: email.to_string(),
        email: email.to_string(),
        longitude: 0.0,
        latitude: 0.0,
        registered_at: None,
        age: 30,
        gender: gender.to_string(),
        password: None,
        address: None,
        profile: None,
    };
    UserRepo::create(pool, &input, None).await.unwrap().id
}

async fn seed_restaurant(pool: &PgPool, name: &str, categories: &[&str]) -> i64 {
    let input = CreateRestaurant {
        name: name.to_string(),
        address: format!("{name} street"),
        longitude: 0.0,
        latitude: 0.0,
        categories: categories.iter().map(|c| c.to_string()).collect(),
    };
    RestaurantRepo::create(pool, &input).await.unwrap().id
}

async fn seed_item(pool: &PgPool, restaurant_id: i64, name: &str, price: i64, tags: &[&str]) -> i64 {
    let input = CreateMenuItem {
        restaurant_id,
        name: name.to_string(),
        description: name.to_string(),
        price: Decimal::new(price, 0),
        available: None,
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
    };
    MenuItemRepo::create(pool, &input).await.unwrap().id
}

async fn seed_order(pool: &PgPool, user_id: i64, restaurant_id: i64, lines: &[(i64, i32)]) -> i64 {
    let requested: Vec<RequestedItem> = lines
        .iter()
        .map(|(menu_item_id, quantity)| RequestedItem {
            menu_item_id: *menu_item_id,
            quantity: *quantity,
            special_instructions: None,
        })
        .collect();
    let ids: Vec<i64> = lines.iter().map(|(id, _)| *id).collect();
    let prices = MenuItemRepo::find_prices(pool, &ids).await.unwrap();
    let priced = price_items(restaurant_id, &requested, &prices).unwrap();
    OrderRepo::create(pool, user_id, restaurant_id, &priced).await.unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_top_restaurants_is_capped_and_sorted(pool: PgPool) {
    let user = seed_user(&pool, "ana@example.com", "female").await;
    for i in 1..=7 {
        let r = seed_restaurant(&pool, &format!("R{i}"), &["food"]).await;
        let item = seed_item(&pool, r, "dish", 10, &[]).await;
        seed_order(&pool, user, r, &[(item, i)]).await;
    }

    let stats = AggregationRepo::top_restaurants(&pool).await.unwrap();
    assert_eq!(stats.len(), 5);
    assert_eq!(stats[0].restaurant, "R7");
    assert_eq!(stats[0].revenue, Decimal::new(70, 0));
    assert!(stats.windows(2).all(|w| w[0].revenue > w[1].revenue));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_simple_counts(pool: PgPool) {
    seed_user(&pool, "a@example.com", "female").await;
    seed_user(&pool, "b@example.com", "male").await;
    seed_user(&pool, "c@example.com", "female").await;
    let r = seed_restaurant(&pool, "Mix", &["mexican", "vegan"]).await;
    seed_restaurant(&pool, "Tex", &["mexican"]).await;
    seed_item(&pool, r, "Taco", 3, &["spicy", "corn"]).await;
    seed_item(&pool, r, "Bowl", 5, &["corn"]).await;

    assert_eq!(AggregationRepo::count_users(&pool).await.unwrap(), 3);
    assert_eq!(
        AggregationRepo::distinct_genders(&pool).await.unwrap(),
        vec!["female".to_string(), "male".to_string()]
    );

    let categories = AggregationRepo::count_by_category(&pool).await.unwrap();
    assert_eq!(categories[0].category, "mexican");
    assert_eq!(categories[0].count, 2);

    assert_eq!(
        AggregationRepo::distinct_menu_tags(&pool).await.unwrap(),
        vec!["corn".to_string(), "spicy".to_string()]
    );
    let tags = AggregationRepo::most_popular_tags(&pool).await.unwrap();
    assert_eq!(tags[0].tag, "corn");
    assert_eq!(tags[0].count, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_database_reports_zero(pool: PgPool) {
    assert_eq!(AggregationRepo::avg_order_value(&pool).await.unwrap(), Decimal::ZERO);
    assert_eq!(AggregationRepo::avg_delivery_time_ms(&pool).await.unwrap(), 0.0);
    assert_eq!(AggregationRepo::count_delivered_orders(&pool).await.unwrap(), 0);
    assert!(AggregationRepo::sales_by_weekday(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sales_by_tag_and_delivery_time(pool: PgPool) {
    let user = seed_user(&pool, "ana@example.com", "female").await;
    let r = seed_restaurant(&pool, "Tacos", &["mexican"]).await;
    let taco = seed_item(&pool, r, "Taco", 3, &["spicy", "corn"]).await;
    let bowl = seed_item(&pool, r, "Bowl", 5, &["corn"]).await;
    let order = seed_order(&pool, user, r, &[(taco, 2), (bowl, 1)]).await;

    let tags = AggregationRepo::total_sales_by_category(&pool).await.unwrap();
    assert_eq!(tags[0].tag, "corn");
    assert_eq!(tags[0].total_sales, Decimal::new(11, 0));
    assert_eq!(tags[1].tag, "spicy");
    assert_eq!(tags[1].total_sales, Decimal::new(6, 0));

    let to_preparing = plan_transition(OrderStatus::Pending, OrderStatus::Preparing).unwrap();
    OrderRepo::apply_status(&pool, order, OrderStatus::Pending, &to_preparing)
        .await
        .unwrap()
        .unwrap();
    let to_delivered = plan_transition(OrderStatus::Preparing, OrderStatus::Delivered).unwrap();
    OrderRepo::apply_status(&pool, order, OrderStatus::Preparing, &to_delivered)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(AggregationRepo::count_delivered_orders(&pool).await.unwrap(), 1);
    assert!(AggregationRepo::avg_delivery_time_ms(&pool).await.unwrap() >= 0.0);

    let per_user = AggregationRepo::orders_per_user(&pool).await.unwrap();
    assert_eq!(per_user.len(), 1);
    assert_eq!(per_user[0].count, 1);

    let monthly = AggregationRepo::monthly_new_users(&pool).await.unwrap();
    assert_eq!(monthly.iter().map(|m| m.count).sum::<i64>(), 1);
}
