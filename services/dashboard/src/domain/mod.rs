pub mod policy;
pub mod repository;
pub mod types;
pub mod validate;
