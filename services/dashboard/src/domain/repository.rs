#![allow(async_fn_in_trait)]

use std::future::Future;

use havenz_auth_types::error::AuthError;
use havenz_auth_types::token::ExternalIdentity;
use havenz_domain::id::{ShopId, UserId};
use havenz_domain::pagination::PageRequest;
use havenz_domain::role::RoleCode;

use crate::domain::policy::{ShopScope, UserVisibility};
use crate::domain::types::{
    NewUser, NewWorkOrder, Role, Shop, User, UserUpdate, WorkOrderDetail, WorkOrderListItem,
};
use crate::error::DashboardError;

// Ports whose futures are awaited inside detached background tasks spell out
// `+ Send`; implementors can still write `async fn`.

/// Repository for dashboard accounts.
pub trait UserRepository: Send + Sync {
    fn find_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, DashboardError>> + Send;

    fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> impl Future<Output = Result<Option<User>, DashboardError>> + Send;

    /// Newest first, restricted to what `visibility` admits.
    fn list(
        &self,
        visibility: &UserVisibility,
        page: PageRequest,
    ) -> impl Future<Output = Result<Vec<User>, DashboardError>> + Send;

    fn find_role(
        &self,
        code: RoleCode,
    ) -> impl Future<Output = Result<Option<Role>, DashboardError>> + Send;

    /// Fails with `UserAlreadyExists` on a duplicate email or external id.
    fn create(&self, user: &NewUser)
    -> impl Future<Output = Result<User, DashboardError>> + Send;

    fn update(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> impl Future<Output = Result<User, DashboardError>> + Send;

    /// Set the deactivation audit pair. A user that is already inactive is returned unchanged.
    fn deactivate(
        &self,
        id: UserId,
        by: UserId,
    ) -> impl Future<Output = Result<User, DashboardError>> + Send;

    /// Clear the deactivation audit pair. A user that is already active is returned unchanged.
    fn reactivate(&self, id: UserId)
    -> impl Future<Output = Result<User, DashboardError>> + Send;

    /// Bump `token_version`, revoking every credential issued before.
    fn increment_token_version(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<User, DashboardError>> + Send;

    fn touch_last_sign_in(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<(), DashboardError>> + Send;

    fn mark_email_verified(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<(), DashboardError>> + Send;
}

/// Repository for shops.
pub trait ShopRepository: Send + Sync {
    async fn find_by_id(&self, id: ShopId) -> Result<Option<Shop>, DashboardError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Shop>, DashboardError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<Shop>, DashboardError>;
    /// Fails with `ShopAlreadyExists` on a duplicate code.
    async fn create(&self, shop: &Shop) -> Result<(), DashboardError>;
    async fn update(&self, shop: &Shop) -> Result<(), DashboardError>;
}

/// Repository for work orders and their intake records.
pub trait WorkOrderRepository: Send + Sync {
    async fn list(
        &self,
        scope: ShopScope,
        page: PageRequest,
    ) -> Result<Vec<WorkOrderListItem>, DashboardError>;

    async fn find_by_code(
        &self,
        scope: ShopScope,
        code: &str,
    ) -> Result<Option<WorkOrderDetail>, DashboardError>;

    /// Insert customer, vehicle, work order and insurance atomically.
    async fn create(&self, order: &NewWorkOrder) -> Result<WorkOrderDetail, DashboardError>;
}

// ── External collaborators ───────────────────────────────────────────────────

/// Verifies a raw bearer credential against the identity provider.
pub trait TokenVerifier: Send + Sync {
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<ExternalIdentity, AuthError>> + Send;
}

/// External identity provider account management.
pub trait IdentityDirectory: Send + Sync {
    /// Returns the new external uid. Fails with `UserAlreadyExists` when the email is taken.
    fn create_passwordless_account(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> impl Future<Output = Result<String, DashboardError>> + Send;

    fn delete_account(&self, uid: &str)
    -> impl Future<Output = Result<(), DashboardError>> + Send;

    fn disable_account(
        &self,
        uid: &str,
    ) -> impl Future<Output = Result<(), DashboardError>> + Send;

    fn enable_account(&self, uid: &str)
    -> impl Future<Output = Result<(), DashboardError>> + Send;

    /// Time-boxed (one hour) password setup link.
    fn generate_password_reset_link(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<String, DashboardError>> + Send;

    fn set_email_verified(
        &self,
        uid: &str,
        verified: bool,
    ) -> impl Future<Output = Result<(), DashboardError>> + Send;
}

/// Outbound templated mail.
pub trait EmailSender: Send + Sync {
    fn send_welcome_setup(
        &self,
        to: &str,
        first_name: &str,
        link: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn send_setup_reminder(
        &self,
        to: &str,
        first_name: &str,
        link: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}
