//! Identity-provider id-token verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Claims read from an identity-provider id token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | external uid |
/// | `email_verified` | custom | provider-side verification flag (absent → `false`) |
/// | `token_version` | custom | optional revocation counter stamped at issue time |
/// | `exp` | `exp` | expiry, seconds since epoch |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_version: Option<i32>,
    pub iss: String,
    pub aud: String,
    pub exp: u64,
}

/// External identity established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub uid: String,
    pub email_verified: bool,
    pub token_version: Option<i32>,
}

/// Verifies signature, expiry, issuer and audience of id tokens.
#[derive(Clone)]
pub struct IdTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl IdTokenVerifier {
    /// RS256 with the provider's PEM-encoded public key.
    pub fn rs256(pem: &[u8], issuer: &str, audience: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(pem)?;
        Ok(Self {
            key,
            validation: validation(Algorithm::RS256, issuer, audience),
        })
    }

    /// HS256 with a shared secret. Used for local development and tests.
    pub fn hs256(secret: &str, issuer: &str, audience: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: validation(Algorithm::HS256, issuer, audience),
        }
    }

    pub fn verify(&self, token: &str) -> Result<ExternalIdentity, AuthError> {
        let data = decode::<IdTokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::CredentialExpired,
                _ => AuthError::InvalidCredential,
            }
        })?;
        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidCredential);
        }
        Ok(ExternalIdentity {
            uid: claims.sub,
            email_verified: claims.email_verified,
            token_version: claims.token_version,
        })
    }
}

// Default leeway (60s) tolerates clock skew with the provider.
fn validation(algorithm: Algorithm, issuer: &str, audience: &str) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
    validation
}
