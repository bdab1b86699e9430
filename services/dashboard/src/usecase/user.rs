use tracing::{error, info, warn};

use havenz_auth_types::identity::Identity;
use havenz_core::tasks::BackgroundTasks;
use havenz_domain::id::{ShopId, UserId};
use havenz_domain::pagination::PageRequest;
use havenz_domain::role::RoleCode;

use crate::domain::policy::{self, FieldChange};
use crate::domain::repository::{EmailSender, IdentityDirectory, ShopRepository, UserRepository};
use crate::domain::types::{NewUser, Role, User, UserUpdate};
use crate::domain::validate;
use crate::error::DashboardError;

async fn find_user<U: UserRepository>(users: &U, id: UserId) -> Result<User, DashboardError> {
    users
        .find_by_id(id)
        .await?
        .ok_or(DashboardError::UserNotFound)
}

/// Parse a role code (case-insensitive) and load its seeded row.
async fn resolve_role<U: UserRepository>(users: &U, code: &str) -> Result<Role, DashboardError> {
    let role = code
        .trim()
        .to_lowercase()
        .parse::<RoleCode>()
        .map_err(|_| DashboardError::validation("roleCode", "invalid role code"))?;
    users
        .find_role(role)
        .await?
        .ok_or_else(|| anyhow::anyhow!("role {role} is not seeded").into())
}

async fn resolve_shop<S: ShopRepository>(shops: &S, code: &str) -> Result<ShopId, DashboardError> {
    shops
        .find_by_code(code)
        .await?
        .map(|shop| shop.id)
        .ok_or_else(|| DashboardError::validation("shopCode", "invalid shop code"))
}

fn trimmed_required(field: &'static str, value: &str) -> Result<String, DashboardError> {
    let value = value.trim();
    validate::require(field, value)?;
    Ok(value.to_owned())
}

fn validate_contact(phone: Option<&str>, image_url: Option<&str>) -> Result<(), DashboardError> {
    if let Some(phone) = phone {
        validate::phone("phone", phone)?;
    }
    if let Some(url) = image_url {
        validate::image_url("imageUrl", url)?;
    }
    Ok(())
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub role_code: String,
    pub shop_code: Option<String>,
}

/// Passwordless provisioning: external account, local row, setup link, welcome mail.
pub struct CreateUserUseCase<U, S, D, E>
where
    U: UserRepository,
    S: ShopRepository,
    D: IdentityDirectory,
    E: EmailSender + Clone + 'static,
{
    pub users: U,
    pub shops: S,
    pub directory: D,
    pub email: E,
    pub tasks: BackgroundTasks,
}

impl<U, S, D, E> CreateUserUseCase<U, S, D, E>
where
    U: UserRepository,
    S: ShopRepository,
    D: IdentityDirectory,
    E: EmailSender + Clone + 'static,
{
    pub async fn execute(
        &self,
        actor: &Identity,
        input: CreateUserInput,
    ) -> Result<User, DashboardError> {
        policy::require_user_manager(actor)?;

        // 1. Normalize and validate
        let email = validate::normalize_email(&input.email);
        validate::email("email", &email)?;
        let first_name = trimmed_required("firstName", &input.first_name)?;
        let last_name = trimmed_required("lastName", &input.last_name)?;
        let phone = validate::trim_opt(input.phone);
        let image_url = validate::trim_opt(input.image_url);
        validate_contact(phone.as_deref(), image_url.as_deref())?;
        let role_code = input.role_code.trim();
        validate::require("roleCode", role_code)?;
        let role = resolve_role(&self.users, role_code).await?;

        // 2. Shop assignment
        let requested = match validate::trim_opt(input.shop_code) {
            Some(code) => {
                Some(resolve_shop(&self.shops, &validate::normalize_code(&code)).await?)
            }
            None => None,
        };
        let shop_id = policy::authorize_creation(actor, role.code, requested)?;

        // 3. External account without a password
        let external_id = self
            .directory
            .create_passwordless_account(&email, &first_name, &last_name)
            .await?;

        // 4. Local row; undo the external account if it fails
        let new_user = NewUser {
            id: UserId::new(),
            email: email.clone(),
            first_name: first_name.clone(),
            last_name,
            phone,
            image_url,
            external_id: external_id.clone(),
            role_id: role.id,
            shop_id,
        };
        let user = match self.users.create(&new_user).await {
            Ok(user) => user,
            Err(e) => {
                if let Err(cleanup) = self.directory.delete_account(&external_id).await {
                    error!(
                        external_id = %external_id,
                        error = %cleanup,
                        "failed to delete external account after local insert failed"
                    );
                }
                return Err(e);
            }
        };
        info!(
            user_id = %user.id,
            role = %role.code,
            created_by = %actor.id,
            "user provisioned"
        );

        // 5. Setup link and welcome mail
        match self.directory.generate_password_reset_link(&email).await {
            Ok(link) => {
                let sender = self.email.clone();
                self.tasks.spawn("send_welcome_setup", async move {
                    sender.send_welcome_setup(&email, &first_name, &link).await
                });
            }
            Err(e) => warn!(
                user_id = %user.id,
                error = %e,
                "setup link not issued, welcome mail skipped"
            ),
        }

        Ok(user)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, actor: &Identity, id: UserId) -> Result<User, DashboardError> {
        policy::require_user_manager(actor)?;
        let user = find_user(&self.users, id).await?;
        policy::can_view(actor, &user)?;
        Ok(user)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        actor: &Identity,
        page: PageRequest,
    ) -> Result<Vec<User>, DashboardError> {
        let visibility = policy::visibility(actor)?;
        self.users.list(&visibility, page.clamped()).await
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

/// Partial update. Email is immutable.
#[derive(Default)]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub role_code: Option<String>,
    pub shop_code: Option<String>,
}

pub struct UpdateUserUseCase<U, S>
where
    U: UserRepository,
    S: ShopRepository,
{
    pub users: U,
    pub shops: S,
}

impl<U, S> UpdateUserUseCase<U, S>
where
    U: UserRepository,
    S: ShopRepository,
{
    pub async fn execute(
        &self,
        actor: &Identity,
        id: UserId,
        input: UpdateUserInput,
    ) -> Result<User, DashboardError> {
        // 1. Coarse management check
        policy::require_user_manager(actor)?;
        let target = find_user(&self.users, id).await?;
        policy::can_manage(actor, &target)?;

        // 2. Resolve codes, then field-level restrictions
        let role = match validate::trim_opt(input.role_code) {
            Some(code) => Some(resolve_role(&self.users, &code).await?),
            None => None,
        };
        let shop_id = match validate::trim_opt(input.shop_code) {
            Some(code) => {
                Some(resolve_shop(&self.shops, &validate::normalize_code(&code)).await?)
            }
            None => None,
        };
        let change = FieldChange {
            role: role.as_ref().map(|r| r.code),
            shop: shop_id,
        };
        policy::check_field_update(actor, &target, &change)?;

        // 3. Validate profile fields
        let first_name = input
            .first_name
            .map(|v| trimmed_required("firstName", &v))
            .transpose()?;
        let last_name = input
            .last_name
            .map(|v| trimmed_required("lastName", &v))
            .transpose()?;
        let phone = validate::trim_opt(input.phone);
        let image_url = validate::trim_opt(input.image_url);
        validate_contact(phone.as_deref(), image_url.as_deref())?;

        let resulting_role = change.role.unwrap_or(target.role.code);
        let resulting_shop = shop_id.or(target.shop_id());
        if resulting_role != RoleCode::SuperAdmin && resulting_shop.is_none() {
            return Err(DashboardError::validation(
                "shopCode",
                "required for non-superadmin roles",
            ));
        }

        // 4. Persist
        let update = UserUpdate {
            first_name,
            last_name,
            phone,
            image_url,
            role_id: role.map(|r| r.id),
            shop_id,
        };
        if update.is_empty() {
            return Ok(target);
        }
        self.users.update(id, &update).await
    }
}

// ── DeactivateUser / ReactivateUser ──────────────────────────────────────────

pub struct DeactivateUserUseCase<U, D>
where
    U: UserRepository,
    D: IdentityDirectory,
{
    pub users: U,
    pub directory: D,
}

impl<U, D> DeactivateUserUseCase<U, D>
where
    U: UserRepository,
    D: IdentityDirectory,
{
    /// Idempotent: deactivating an inactive user returns it unchanged.
    pub async fn execute(&self, actor: &Identity, id: UserId) -> Result<User, DashboardError> {
        policy::ensure_not_self(actor, id, "deactivate")?;
        policy::require_user_manager(actor)?;
        let target = find_user(&self.users, id).await?;
        policy::can_manage(actor, &target)?;
        if !target.is_active {
            return Ok(target);
        }

        let user = self.users.deactivate(id, actor.id).await?;
        info!(user_id = %id, deactivated_by = %actor.id, "user deactivated");
        if let Err(e) = self.directory.disable_account(&user.external_id).await {
            warn!(user_id = %id, error = %e, "failed to disable external account");
        }
        Ok(user)
    }
}

pub struct ReactivateUserUseCase<U, D>
where
    U: UserRepository,
    D: IdentityDirectory,
{
    pub users: U,
    pub directory: D,
}

impl<U, D> ReactivateUserUseCase<U, D>
where
    U: UserRepository,
    D: IdentityDirectory,
{
    pub async fn execute(&self, actor: &Identity, id: UserId) -> Result<User, DashboardError> {
        policy::ensure_not_self(actor, id, "reactivate")?;
        policy::require_user_manager(actor)?;
        let target = find_user(&self.users, id).await?;
        policy::can_manage(actor, &target)?;
        if target.is_active {
            return Ok(target);
        }

        let user = self.users.reactivate(id).await?;
        info!(user_id = %id, reactivated_by = %actor.id, "user reactivated");
        if let Err(e) = self.directory.enable_account(&user.external_id).await {
            warn!(user_id = %id, error = %e, "failed to enable external account");
        }
        Ok(user)
    }
}

// ── ResendSetupLink ──────────────────────────────────────────────────────────

pub struct ResendSetupLinkUseCase<U, D, E>
where
    U: UserRepository,
    D: IdentityDirectory,
    E: EmailSender + Clone + 'static,
{
    pub users: U,
    pub directory: D,
    pub email: E,
    pub tasks: BackgroundTasks,
}

impl<U, D, E> ResendSetupLinkUseCase<U, D, E>
where
    U: UserRepository,
    D: IdentityDirectory,
    E: EmailSender + Clone + 'static,
{
    pub async fn execute(&self, actor: &Identity, id: UserId) -> Result<(), DashboardError> {
        policy::require_user_manager(actor)?;
        let target = find_user(&self.users, id).await?;
        policy::can_manage(actor, &target)?;

        let link = self
            .directory
            .generate_password_reset_link(&target.email)
            .await?;
        let sender = self.email.clone();
        self.tasks.spawn("send_setup_reminder", async move {
            sender
                .send_setup_reminder(&target.email, &target.first_name, &link)
                .await
        });
        Ok(())
    }
}

// ── RevokeSessions ───────────────────────────────────────────────────────────

pub struct RevokeSessionsUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RevokeSessionsUseCase<U> {
    /// Bump the token version so every credential issued so far is rejected.
    pub async fn execute(&self, actor: &Identity, id: UserId) -> Result<User, DashboardError> {
        policy::require_user_manager(actor)?;
        let target = find_user(&self.users, id).await?;
        policy::can_manage(actor, &target)?;
        let user = self.users.increment_token_version(id).await?;
        info!(
            user_id = %id,
            token_version = user.token_version,
            revoked_by = %actor.id,
            "sessions revoked"
        );
        Ok(user)
    }
}
