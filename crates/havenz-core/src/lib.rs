//! Ambient infrastructure shared by HavenzSure services: configuration,
//! tracing, health probes, HTTP layers, serde helpers and the detached
//! background task executor.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tasks;
pub mod tracing;
