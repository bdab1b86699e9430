//! Input normalization and format checks shared by the entity services.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DashboardError;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email regex")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("phone regex"));

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9][A-Z][0-9][A-Z][0-9]$").expect("postal regex"));

static VIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("vin regex"));

/// Canadian province and territory abbreviations.
pub const PROVINCES: [&str; 13] = [
    "AB", "BC", "MB", "NB", "NL", "NT", "NS", "NU", "ON", "PE", "QC", "SK", "YT",
];

// ── Normalization ────────────────────────────────────────────────────────────

/// Trim; blank becomes `None`.
pub fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn normalize_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Uppercase and drop all whitespace: `"t2p 1j9"` → `"T2P1J9"`.
pub fn normalize_postal_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

// ── Checks ───────────────────────────────────────────────────────────────────

pub fn require(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if value.trim().is_empty() {
        return Err(DashboardError::validation(field, "cannot be blank"));
    }
    Ok(())
}

pub fn email(field: &'static str, value: &str) -> Result<(), DashboardError> {
    require(field, value)?;
    if !EMAIL.is_match(value) {
        return Err(DashboardError::validation(field, "invalid email format"));
    }
    Ok(())
}

pub fn phone(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if !PHONE.is_match(value) {
        return Err(DashboardError::validation(
            field,
            "must be in the format 000-000-0000",
        ));
    }
    Ok(())
}

pub fn image_url(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(DashboardError::validation(
            field,
            "must start with http:// or https://",
        ));
    }
    Ok(())
}

pub fn postal_code(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if !POSTAL_CODE.is_match(value) {
        return Err(DashboardError::validation(
            field,
            "must be in the format A1A1A1",
        ));
    }
    Ok(())
}

pub fn province(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if !PROVINCES.contains(&value) {
        return Err(DashboardError::validation(field, "invalid province code"));
    }
    Ok(())
}

pub fn vin(field: &'static str, value: &str) -> Result<(), DashboardError> {
    if !VIN.is_match(value) {
        return Err(DashboardError::validation(
            field,
            "must be 17 characters excluding I, O and Q",
        ));
    }
    Ok(())
}
