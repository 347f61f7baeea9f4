pub mod aggregation;
pub mod auth;
pub mod file;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod restaurant;
pub mod review;
pub mod user;
