//! Instance-level authorization.
//!
//! The permission table in `havenz_auth_types::permission` decides whether a role
//! may attempt an operation at all. The functions here decide whether a given
//! actor may perform it against a given target, and which shop a request is
//! confined to. Everything is pure: no IO and no ambient state.
//!
//! Privilege is ordered superadmin > admin > staff. Superadmins bypass every rule.
//! Admins never see superadmins and see staff only inside their own shop; targets
//! an admin cannot see are reported as missing rather than forbidden.

use havenz_auth_types::identity::Identity;
use havenz_domain::id::{ShopId, UserId};
use havenz_domain::role::{RoleCode, Tier};

use crate::domain::types::User;
use crate::error::DashboardError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Coarse deny: the actor's role has no business here.
    #[error("forbidden")]
    Forbidden,
    /// The target exists but must look absent to this actor.
    #[error("not found")]
    TargetHidden,
    #[error("{message}")]
    PermissionDenied { field: &'static str, message: String },
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("no shop assignment")]
    NoShopAssignment,
}

impl PolicyError {
    fn denied(field: &'static str, message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            field,
            message: message.into(),
        }
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

// Hidden targets only arise from user visibility, so they surface as a missing user.
impl From<PolicyError> for DashboardError {
    fn from(e: PolicyError) -> Self {
        match e {
            PolicyError::Forbidden => Self::Forbidden,
            PolicyError::TargetHidden => Self::UserNotFound,
            PolicyError::PermissionDenied { field, message } => {
                Self::permission_denied(field, message)
            }
            PolicyError::Validation { field, message } => Self::validation(field, message),
            PolicyError::NoShopAssignment => Self::NoShopAssignment,
        }
    }
}

// ── Visibility ───────────────────────────────────────────────────────────────

/// Which user records an actor may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVisibility {
    Everyone,
    /// Every admin, plus staff of `shop`. No superadmins.
    AdminView { shop: Option<ShopId> },
}

impl UserVisibility {
    pub fn admits(&self, user: &User) -> bool {
        match self {
            Self::Everyone => true,
            Self::AdminView { shop } => match user.role_code().tier() {
                Tier::SuperAdmin => false,
                Tier::Admin => true,
                Tier::Staff => shop.is_some() && user.shop_id() == *shop,
            },
        }
    }
}

/// Staff never reach user management.
pub fn require_user_manager(actor: &Identity) -> Result<(), PolicyError> {
    if actor.is_admin_or_above() {
        Ok(())
    } else {
        Err(PolicyError::Forbidden)
    }
}

pub fn visibility(actor: &Identity) -> Result<UserVisibility, PolicyError> {
    require_user_manager(actor)?;
    if actor.is_super_admin() {
        Ok(UserVisibility::Everyone)
    } else {
        Ok(UserVisibility::AdminView {
            shop: actor.shop_id,
        })
    }
}

pub fn can_view(actor: &Identity, target: &User) -> Result<(), PolicyError> {
    if visibility(actor)?.admits(target) {
        Ok(())
    } else {
        Err(PolicyError::TargetHidden)
    }
}

// ── Management ───────────────────────────────────────────────────────────────

/// Whether `actor` may mutate `target` at all (update, deactivate, reactivate,
/// resend link, revoke sessions).
pub fn can_manage(actor: &Identity, target: &User) -> Result<(), PolicyError> {
    require_user_manager(actor)?;
    if actor.is_super_admin() {
        return Ok(());
    }
    match target.role_code().tier() {
        Tier::SuperAdmin => Err(PolicyError::TargetHidden),
        Tier::Admin if target.id == actor.id => Ok(()),
        Tier::Admin => Err(PolicyError::denied(
            "permissions",
            "cannot manage other administrators",
        )),
        Tier::Staff => {
            let Some(own) = actor.shop_id else {
                return Err(PolicyError::denied(
                    "shopId",
                    "administrator has no shop assignment",
                ));
            };
            let Some(theirs) = target.shop_id() else {
                return Err(PolicyError::denied(
                    "shopId",
                    "target user has no shop assignment",
                ));
            };
            if own == theirs {
                Ok(())
            } else {
                Err(PolicyError::TargetHidden)
            }
        }
    }
}

/// Role and shop values an update would write, already resolved from their codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldChange {
    pub role: Option<RoleCode>,
    pub shop: Option<ShopId>,
}

/// Field-level restrictions layered on top of [`can_manage`].
pub fn check_field_update(
    actor: &Identity,
    target: &User,
    change: &FieldChange,
) -> Result<(), PolicyError> {
    require_user_manager(actor)?;
    if actor.is_super_admin() {
        return Ok(());
    }
    if let Some(role) = change.role {
        if role.tier() >= Tier::Admin {
            return Err(PolicyError::denied(
                "roleCode",
                "cannot promote users to admin role",
            ));
        }
        if target.id == actor.id {
            return Err(PolicyError::denied("roleCode", "cannot change your own role"));
        }
    }
    if let Some(shop) = change.shop {
        if Some(shop) != target.shop_id() {
            return Err(PolicyError::denied(
                "shopCode",
                "only a superadmin can move users between shops",
            ));
        }
    }
    Ok(())
}

/// Check that `actor` may provision an account with `role`, and return the shop it
/// lands in. `requested` is the already-resolved shop code from the input.
pub fn authorize_creation(
    actor: &Identity,
    role: RoleCode,
    requested: Option<ShopId>,
) -> Result<Option<ShopId>, PolicyError> {
    require_user_manager(actor)?;
    if actor.is_super_admin() {
        if role != RoleCode::SuperAdmin && requested.is_none() {
            return Err(PolicyError::invalid(
                "shopCode",
                "required for non-superadmin roles",
            ));
        }
        return Ok(requested);
    }
    if role.tier() >= Tier::Admin {
        return Err(PolicyError::denied(
            "roleCode",
            "administrators can only create adjuster or bodyman accounts",
        ));
    }
    let Some(own) = actor.shop_id else {
        return Err(PolicyError::denied(
            "shopId",
            "administrator has no shop assignment",
        ));
    };
    match requested {
        Some(shop) if shop != own => Err(PolicyError::invalid(
            "shopCode",
            "must match your own shop",
        )),
        _ => Ok(Some(own)),
    }
}

/// `verb` names the action in the message, e.g. `"deactivate"`.
pub fn ensure_not_self(
    actor: &Identity,
    target: UserId,
    verb: &'static str,
) -> Result<(), PolicyError> {
    if actor.id == target {
        return Err(PolicyError::invalid(
            "permissions",
            format!("cannot {verb} yourself"),
        ));
    }
    Ok(())
}

// ── Shop scoping ─────────────────────────────────────────────────────────────

/// Rows a request is confined to for shop-owned entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopScope {
    All,
    Shop(ShopId),
}

impl ShopScope {
    pub fn admits(&self, shop: ShopId) -> bool {
        match self {
            Self::All => true,
            Self::Shop(own) => *own == shop,
        }
    }
}

/// Non-superadmins are pinned to their shop; missing one is an error, never an empty result.
pub fn shop_scope(actor: &Identity) -> Result<ShopScope, PolicyError> {
    if actor.is_super_admin() {
        return Ok(ShopScope::All);
    }
    actor
        .shop_id
        .map(ShopScope::Shop)
        .ok_or(PolicyError::NoShopAssignment)
}

/// Shop a new shop-owned record belongs to. Superadmins must name one; everyone
/// else gets their own, and a named shop must agree with it.
pub fn owning_shop(actor: &Identity, requested: Option<ShopId>) -> Result<ShopId, PolicyError> {
    match (shop_scope(actor)?, requested) {
        (ShopScope::All, Some(shop)) => Ok(shop),
        (ShopScope::All, None) => Err(PolicyError::invalid("shopCode", "cannot be blank")),
        (ShopScope::Shop(own), Some(shop)) if shop != own => Err(PolicyError::invalid(
            "shopCode",
            "must match your own shop",
        )),
        (ShopScope::Shop(own), _) => Ok(own),
    }
}
