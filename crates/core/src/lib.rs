//! Domain logic shared by the database, API and console crates.
//!
//! Nothing in here performs I/O: these are the types, validation rules and
//! state machines the outer layers call into.

pub mod error;
pub mod order_pricing;
pub mod order_status;
pub mod payment;
pub mod projection;
pub mod promotion;
pub mod query_spec;
pub mod review;
pub mod roles;
pub mod types;
pub mod user;
pub mod write_check;
