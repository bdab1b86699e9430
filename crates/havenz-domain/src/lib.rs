//! Domain types shared across HavenzSure dashboard crates.
//!
//! Pure value types with no framework dependencies: ids, roles, statuses and
//! pagination.

pub mod id;
pub mod pagination;
pub mod role;
pub mod status;
