//! Test utilities for HavenzSure services.
//!
//! Provides identity fixtures and id-token minting.
//! Import as a dev-dependency only; never in production code.

pub mod auth;
