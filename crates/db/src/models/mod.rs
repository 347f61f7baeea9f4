//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches
//! - The [`EntityFields`](comanda_core::query_spec::EntityFields) whitelist
//!   used for sorting and projection

pub mod aggregation;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod restaurant;
pub mod review;
pub mod stored_file;
pub mod user;
