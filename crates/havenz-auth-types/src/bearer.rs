//! `Authorization: Bearer <token>` extraction.

use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::HeaderMap;

use crate::error::AuthError;

/// Return the bearer token from the request headers.
///
/// Absent header, a non-bearer scheme, or an empty token all fail with
/// [`AuthError::NoCredential`].
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let Authorization(bearer) = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AuthError::NoCredential)?;
    let token = bearer.token().trim();
    if token.is_empty() {
        return Err(AuthError::NoCredential);
    }
    Ok(token.to_owned())
}
