use axum::http::HeaderMap;
use tracing::{error, warn};

use havenz_auth_types::bearer::bearer_token;
use havenz_auth_types::error::AuthError;
use havenz_auth_types::identity::Identity;
use havenz_core::tasks::BackgroundTasks;

use crate::domain::repository::{IdentityDirectory, TokenVerifier, UserRepository};
use crate::error::DashboardError;

/// Authentication outcome that is not an [`Identity`].
///
/// `Auth` is a credential or account-state rejection. `Internal` is an
/// infrastructure failure hit while resolving and must not be reported as 401.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Internal(#[from] DashboardError),
}

impl From<ResolveError> for DashboardError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Auth(auth) => auth.into(),
            ResolveError::Internal(inner) => inner,
        }
    }
}

// ── ResolveIdentity ──────────────────────────────────────────────────────────

pub struct ResolveIdentityUseCase<V, U, D>
where
    V: TokenVerifier,
    U: UserRepository + Clone + 'static,
    D: IdentityDirectory + Clone + 'static,
{
    pub verifier: V,
    pub users: U,
    pub directory: D,
    pub tasks: BackgroundTasks,
}

impl<V, U, D> ResolveIdentityUseCase<V, U, D>
where
    V: TokenVerifier,
    U: UserRepository + Clone + 'static,
    D: IdentityDirectory + Clone + 'static,
{
    pub async fn execute(&self, headers: &HeaderMap) -> Result<Identity, ResolveError> {
        let result = self.resolve(headers).await;
        // Account-state rejections are logged where they happen, with the ids involved.
        if let Err(ResolveError::Auth(reason)) = &result {
            if !reason.is_account_state() {
                warn!(reason = reason.reason(), "authentication rejected");
            }
        }
        result
    }

    async fn resolve(&self, headers: &HeaderMap) -> Result<Identity, ResolveError> {
        // 1. Bearer credential
        let token = bearer_token(headers)?;

        // 2. Signature, expiry, issuer, audience
        let external = self.verifier.verify(&token).await?;

        // 3. Local directory record
        let Some(user) = self.users.find_by_external_id(&external.uid).await? else {
            error!(
                reason = AuthError::UserNotFound.reason(),
                external_id = %external.uid,
                "verified credential has no local user record"
            );
            return Err(AuthError::UserNotFound.into());
        };

        // 4. Account state, then revocation
        if !user.is_active {
            warn!(
                reason = AuthError::UserInactive.reason(),
                user_id = %user.id,
                external_id = %user.external_id,
                deactivated_by = ?user.deactivated_by.map(|id| id.to_string()),
                "deactivated user presented a valid credential"
            );
            return Err(AuthError::UserInactive.into());
        }
        if let Some(version) = external.token_version {
            if version < user.token_version {
                return Err(AuthError::CredentialRevoked.into());
            }
        }

        // 5. First sign-in: sync the verified flag on both sides
        if !user.email_verified {
            let users = self.users.clone();
            let directory = self.directory.clone();
            let (id, uid) = (user.id, user.external_id.clone());
            self.tasks.spawn("mark_email_verified", async move {
                let remote = directory.set_email_verified(&uid, true).await;
                if let Err(ref e) = remote {
                    warn!(user_id = %id, error = %e, "failed to mark email verified at provider");
                }
                let local = users.mark_email_verified(id).await;
                if let Err(ref e) = local {
                    warn!(user_id = %id, error = %e, "failed to mark email verified locally");
                }
                if remote.is_err() || local.is_err() {
                    anyhow::bail!("email verified flag only partially synced");
                }
                Ok(())
            });
        }

        // 6. Last sign-in
        let users = self.users.clone();
        let id = user.id;
        self.tasks.spawn("touch_last_sign_in", async move {
            users.touch_last_sign_in(id).await?;
            Ok(())
        });

        // 7. Request-scoped identity
        Ok(user.to_identity())
    }
}
