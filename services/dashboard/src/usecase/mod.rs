pub mod auth;
pub mod me;
pub mod shop;
pub mod user;
pub mod workorder;
