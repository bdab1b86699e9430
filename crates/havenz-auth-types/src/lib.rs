//! Authentication and authorization primitives shared across HavenzSure crates.
//!
//! Provides the request-scoped [`identity::Identity`], the static role→operation
//! [`permission`] table, bearer credential extraction and id-token verification.

pub mod bearer;
pub mod error;
pub mod identity;
pub mod permission;
pub mod token;
