//! The authenticated caller.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

use havenz_domain::id::{ShopId, UserId};
use havenz_domain::role::{RoleCode, Tier};

use crate::permission::{self, Operation};

/// Request-scoped identity of the actor, rebuilt from the user directory on every request.
///
/// Inserted into request extensions by the authentication middleware. Handlers
/// extract it and pass it explicitly to every policy and usecase call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub external_id: String,
    pub role: RoleCode,
    pub shop_id: Option<ShopId>,
    pub token_version: i32,
    pub is_active: bool,
}

impl Identity {
    pub fn has_role(&self, roles: &[RoleCode]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == RoleCode::SuperAdmin
    }

    /// Exactly admin. Superadmin is excluded.
    pub fn is_admin_only(&self) -> bool {
        self.role == RoleCode::Admin
    }

    pub fn is_admin_or_above(&self) -> bool {
        self.role.tier() >= Tier::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn has_shop(&self) -> bool {
        self.shop_id.is_some()
    }

    /// Coarse permission-table check for this identity's role.
    pub fn can(&self, operation: Operation) -> bool {
        permission::can(self.role, operation)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().cloned();
        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
