//! Route definitions for the `/aggregations` reporting catalog.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::aggregation as agg;
use crate::state::AppState;

/// Routes mounted at `/aggregations`.
///
/// ```text
/// GET  /simples/countUsers                  -> count_users
/// GET  /simples/distinctGenders             -> distinct_genders
/// GET  /simples/countByCategory             -> count_by_category
/// GET  /simples/distinctMenuTags            -> distinct_menu_tags
/// GET  /simples/countDeliveredOrders        -> count_delivered_orders
///
/// GET  /complejas/topRestaurants            -> top_restaurants
/// GET  /complejas/salesByWeekday            -> sales_by_weekday
/// GET  /complejas/avgRatingPerRestaurant    -> avg_rating_per_restaurant
/// GET  /complejas/avgOrderValue             -> avg_order_value
/// GET  /complejas/mostPopularTags           -> most_popular_tags
/// GET  /complejas/activePromotions          -> active_promotions
/// GET  /complejas/avgDeliveryTime           -> avg_delivery_time
/// GET  /complejas/ordersPerUser             -> orders_per_user
/// GET  /complejas/totalSalesByCategory      -> total_sales_by_category
/// GET  /complejas/monthlyNewUsers           -> monthly_new_users
///
/// POST /arrays/pushTag                      -> push_tag
/// POST /arrays/pullTag                      -> pull_tag
/// POST /arrays/addToSet                     -> add_to_set
/// POST /arrays/popFirst                     -> pop_first
/// POST /arrays/pullAll                      -> pull_all
///
/// GET  /embedded/userOrders?user_id=        -> user_orders
/// POST /embedded/addAddress                 -> add_address
/// POST /embedded/mergeProfile               -> merge_profile
/// GET  /embedded/getAddress?user_id=        -> get_address
/// GET  /embedded/projectOrders              -> project_orders
/// ```
pub fn router() -> Router<AppState> {
    let simples = Router::new()
        .route("/countUsers", get(agg::count_users))
        .route("/distinctGenders", get(agg::distinct_genders))
        .route("/countByCategory", get(agg::count_by_category))
        .route("/distinctMenuTags", get(agg::distinct_menu_tags))
        .route("/countDeliveredOrders", get(agg::count_delivered_orders));

    let complejas = Router::new()
        .route("/topRestaurants", get(agg::top_restaurants))
        .route("/salesByWeekday", get(agg::sales_by_weekday))
        .route("/avgRatingPerRestaurant", get(agg::avg_rating_per_restaurant))
        .route("/avgOrderValue", get(agg::avg_order_value))
        .route("/mostPopularTags", get(agg::most_popular_tags))
        .route("/activePromotions", get(agg::active_promotions))
        .route("/avgDeliveryTime", get(agg::avg_delivery_time))
        .route("/ordersPerUser", get(agg::orders_per_user))
        .route("/totalSalesByCategory", get(agg::total_sales_by_category))
        .route("/monthlyNewUsers", get(agg::monthly_new_users));

    let arrays = Router::new()
        .route("/pushTag", post(agg::push_tag))
        .route("/pullTag", post(agg::pull_tag))
        .route("/addToSet", post(agg::add_to_set))
        .route("/popFirst", post(agg::pop_first))
        .route("/pullAll", post(agg::pull_all));

    let embedded = Router::new()
        .route("/userOrders", get(agg::user_orders))
        .route("/addAddress", post(agg::add_address))
        .route("/mergeProfile", post(agg::merge_profile))
        .route("/getAddress", get(agg::get_address))
        .route("/projectOrders", get(agg::project_orders));

    Router::new()
        .nest("/simples", simples)
        .nest("/complejas", complejas)
        .nest("/arrays", arrays)
        .nest("/embedded", embedded)
}
