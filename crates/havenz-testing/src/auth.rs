//! Auth fixtures for tests.
//!
//! `MockAuth` builds [`Identity`] values for usecase tests and signs HS256 id
//! tokens for tests that exercise the authentication resolver end to end.

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use jsonwebtoken::{EncodingKey, Header, encode};

use havenz_auth_types::identity::Identity;
use havenz_auth_types::token::{IdTokenClaims, IdTokenVerifier};
use havenz_domain::id::{ShopId, UserId};
use havenz_domain::role::RoleCode;

pub const TEST_TOKEN_SECRET: &str = "havenz-test-secret";
pub const TEST_TOKEN_ISSUER: &str = "https://securetoken.test/havenz";
pub const TEST_TOKEN_AUDIENCE: &str = "havenz-test";

/// Identity fixture builders.
pub struct MockAuth;

impl MockAuth {
    pub fn identity(role: RoleCode, shop_id: Option<ShopId>) -> Identity {
        let id = UserId::new();
        Identity {
            id,
            email: format!("{}-{}@havenz.test", role.code(), id),
            external_id: format!("ext-{id}"),
            role,
            shop_id,
            token_version: 0,
            is_active: true,
        }
    }

    pub fn superadmin() -> Identity {
        Self::identity(RoleCode::SuperAdmin, None)
    }

    pub fn admin(shop_id: ShopId) -> Identity {
        Self::identity(RoleCode::Admin, Some(shop_id))
    }

    pub fn adjuster(shop_id: ShopId) -> Identity {
        Self::identity(RoleCode::Adjuster, Some(shop_id))
    }

    pub fn bodyman(shop_id: ShopId) -> Identity {
        Self::identity(RoleCode::Bodyman, Some(shop_id))
    }

    /// Verifier matching [`MockAuth::token`].
    pub fn verifier() -> IdTokenVerifier {
        IdTokenVerifier::hs256(TEST_TOKEN_SECRET, TEST_TOKEN_ISSUER, TEST_TOKEN_AUDIENCE)
    }

    /// Sign an id token for `uid`, valid for one hour.
    pub fn token(uid: &str, email_verified: bool, token_version: Option<i32>) -> String {
        Self::token_expiring(uid, email_verified, token_version, now_secs() + 3600)
    }

    pub fn token_expiring(
        uid: &str,
        email_verified: bool,
        token_version: Option<i32>,
        exp: u64,
    ) -> String {
        let claims = IdTokenClaims {
            sub: uid.to_owned(),
            email_verified,
            token_version,
            iss: TEST_TOKEN_ISSUER.to_owned(),
            aud: TEST_TOKEN_AUDIENCE.to_owned(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_TOKEN_SECRET.as_bytes()),
        )
        .unwrap()
    }

    /// `Authorization: Bearer <token>` header map.
    pub fn bearer_headers(token: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        map
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
