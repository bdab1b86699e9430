//! sea-orm entities for the dashboard database.

pub mod customers;
pub mod insurance;
pub mod roles;
pub mod shops;
pub mod users;
pub mod vehicles;
pub mod work_orders;
