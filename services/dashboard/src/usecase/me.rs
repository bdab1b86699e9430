use havenz_auth_types::identity::Identity;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, UserUpdate};
use crate::domain::validate;
use crate::error::DashboardError;

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, actor: &Identity) -> Result<User, DashboardError> {
        self.users
            .find_by_id(actor.id)
            .await?
            .ok_or(DashboardError::UserNotFound)
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

pub struct UpdateMeInput {
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

/// Self-service contact edits. Role, shop and names stay with user management.
pub struct UpdateMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateMeUseCase<U> {
    pub async fn execute(
        &self,
        actor: &Identity,
        input: UpdateMeInput,
    ) -> Result<User, DashboardError> {
        let phone = validate::trim_opt(input.phone);
        if let Some(ref phone) = phone {
            validate::phone("phone", phone)?;
        }
        let image_url = validate::trim_opt(input.image_url);
        if let Some(ref url) = image_url {
            validate::image_url("imageUrl", url)?;
        }

        let update = UserUpdate {
            phone,
            image_url,
            ..Default::default()
        };
        if update.is_empty() {
            return self
                .users
                .find_by_id(actor.id)
                .await?
                .ok_or(DashboardError::UserNotFound);
        }
        self.users.update(actor.id, &update).await
    }
}
