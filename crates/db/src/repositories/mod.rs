//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Writes that can collide on a
//! natural key or break a field rule have a matching `check_*` method that
//! returns a [`WriteCheck`](comanda_core::write_check::WriteCheck).

pub mod aggregation_repo;
pub mod menu_item_repo;
pub mod order_repo;
pub mod payment_repo;
pub mod promotion_repo;
pub mod restaurant_repo;
pub mod review_repo;
pub mod stored_file_repo;
pub mod user_repo;

pub use aggregation_repo::AggregationRepo;
pub use menu_item_repo::MenuItemRepo;
pub use order_repo::OrderRepo;
pub use payment_repo::PaymentRepo;
pub use promotion_repo::PromotionRepo;
pub use restaurant_repo::RestaurantRepo;
pub use review_repo::ReviewRepo;
pub use stored_file_repo::StoredFileRepo;
pub use user_repo::UserRepo;
