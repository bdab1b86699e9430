use axum::{Json, extract::State};
use serde::Deserialize;

use havenz_auth_types::identity::Identity;

use crate::error::DashboardError;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::me::{GetMeUseCase, UpdateMeInput, UpdateMeUseCase};

// ── GET /me ──────────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(&identity).await?.into()))
}

// ── PATCH /me ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

pub async fn update_me(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = UpdateMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            &identity,
            UpdateMeInput {
                phone: body.phone,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok(Json(user.into()))
}
