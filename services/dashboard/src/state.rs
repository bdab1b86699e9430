use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use havenz_core::tasks::BackgroundTasks;

use crate::infra::db::{DbShopRepository, DbUserRepository, DbWorkOrderRepository};
use crate::infra::email::AppEmailSender;
use crate::infra::identity::{HttpIdentityDirectory, JwtTokenVerifier};

/// Shared application state passed to every handler via axum `State`.
///
/// External clients are opened once at startup and closed on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub verifier: JwtTokenVerifier,
    pub directory: HttpIdentityDirectory,
    pub email: AppEmailSender,
    pub tasks: BackgroundTasks,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn shop_repo(&self) -> DbShopRepository {
        DbShopRepository {
            db: self.db.clone(),
        }
    }

    pub fn work_order_repo(&self) -> DbWorkOrderRepository {
        DbWorkOrderRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
