use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use havenz_auth_types::identity::Identity;
use havenz_domain::id::UserId;
use havenz_domain::pagination::PageRequest;

use crate::domain::types::{ShopSummary, User};
use crate::error::DashboardError;
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserInput, CreateUserUseCase, DeactivateUserUseCase, GetUserUseCase, ListUsersUseCase,
    ReactivateUserUseCase, ResendSetupLinkUseCase, RevokeSessionsUseCase, UpdateUserInput,
    UpdateUserUseCase,
};

// ── Response shapes ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSummaryResponse {
    pub id: String,
    pub code: String,
    pub name: String,
}

impl From<ShopSummary> for ShopSummaryResponse {
    fn from(shop: ShopSummary) -> Self {
        Self {
            id: shop.id.to_string(),
            code: shop.code,
            name: shop.name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub role_code: String,
    pub role_name: String,
    pub shop: Option<ShopSummaryResponse>,
    pub is_active: bool,
    pub email_verified: bool,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms_opt")]
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivated_by: Option<String>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms_opt")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            image_url: user.image_url,
            role_code: user.role.code.code().to_owned(),
            role_name: user.role.name,
            shop: user.shop.map(Into::into),
            is_active: user.is_active,
            email_verified: user.email_verified,
            deactivated_at: user.deactivated_at,
            deactivated_by: user.deactivated_by.map(|id| id.to_string()),
            last_sign_in_at: user.last_sign_in_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub role_code: String,
    pub shop_code: Option<String>,
}

pub async fn create_user(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), DashboardError> {
    let usecase = CreateUserUseCase {
        users: state.user_repo(),
        shops: state.shop_repo(),
        directory: state.directory.clone(),
        email: state.email.clone(),
        tasks: state.tasks.clone(),
    };
    let user = usecase
        .execute(
            &identity,
            CreateUserInput {
                email: body.email,
                first_name: body.first_name,
                last_name: body.last_name,
                phone: body.phone,
                image_url: body.image_url,
                role_code: body.role_code,
                shop_code: body.shop_code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(
    identity: Identity,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<UserResponse>>, DashboardError> {
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(&identity, page).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}

// ── PUT /users/{id} ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub role_code: Option<String>,
    pub shop_code: Option<String>,
}

pub async fn update_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
        shops: state.shop_repo(),
    };
    let user = usecase
        .execute(
            &identity,
            id,
            UpdateUserInput {
                first_name: body.first_name,
                last_name: body.last_name,
                phone: body.phone,
                image_url: body.image_url,
                role_code: body.role_code,
                shop_code: body.shop_code,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── PUT /users/{id}/deactivate, /users/{id}/reactivate ───────────────────────

pub async fn deactivate_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = DeactivateUserUseCase {
        users: state.user_repo(),
        directory: state.directory.clone(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}

pub async fn reactivate_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = ReactivateUserUseCase {
        users: state.user_repo(),
        directory: state.directory.clone(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}

// ── POST /users/{id}/resend-password-link ────────────────────────────────────

pub async fn resend_password_link(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, DashboardError> {
    let usecase = ResendSetupLinkUseCase {
        users: state.user_repo(),
        directory: state.directory.clone(),
        email: state.email.clone(),
        tasks: state.tasks.clone(),
    };
    usecase.execute(&identity, id).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /users/{id}/revoke-sessions ─────────────────────────────────────────

pub async fn revoke_sessions(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, DashboardError> {
    let usecase = RevokeSessionsUseCase {
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}
