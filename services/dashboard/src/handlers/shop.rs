use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use havenz_auth_types::identity::Identity;
use havenz_domain::id::ShopId;
use havenz_domain::pagination::PageRequest;

use crate::domain::types::Shop;
use crate::error::DashboardError;
use crate::state::AppState;
use crate::usecase::shop::{
    CreateShopUseCase, GetShopUseCase, ListShopsUseCase, ShopFields, UpdateShopInput,
    UpdateShopUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub status: &'static str,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Shop> for ShopResponse {
    fn from(shop: Shop) -> Self {
        Self {
            id: shop.id.to_string(),
            code: shop.code,
            name: shop.name,
            status: shop.status.as_str(),
            address: shop.address,
            city: shop.city,
            province: shop.province,
            postal_code: shop.postal_code,
            contact_name: shop.contact_name,
            phone: shop.phone,
            email: shop.email,
            created_at: shop.created_at,
            updated_at: shop.updated_at,
        }
    }
}

// ── POST /shops ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShopRequest {
    pub code: String,
    pub name: String,
    pub status: Option<String>,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
}

pub async fn create_shop(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateShopRequest>,
) -> Result<(StatusCode, Json<ShopResponse>), DashboardError> {
    let usecase = CreateShopUseCase {
        shops: state.shop_repo(),
    };
    let shop = usecase
        .execute(
            &identity,
            ShopFields {
                code: body.code,
                name: body.name,
                status: body.status,
                address: body.address,
                city: body.city,
                province: body.province,
                postal_code: body.postal_code,
                contact_name: body.contact_name,
                phone: body.phone,
                email: body.email,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(shop.into())))
}

// ── GET /shops ───────────────────────────────────────────────────────────────

pub async fn list_shops(
    identity: Identity,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<ShopResponse>>, DashboardError> {
    let usecase = ListShopsUseCase {
        shops: state.shop_repo(),
    };
    let shops = usecase.execute(&identity, page).await?;
    Ok(Json(shops.into_iter().map(Into::into).collect()))
}

// ── GET /shops/{id}, GET /shops/by-code/{code} ───────────────────────────────

pub async fn get_shop(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<ShopId>,
) -> Result<Json<ShopResponse>, DashboardError> {
    let usecase = GetShopUseCase {
        shops: state.shop_repo(),
    };
    Ok(Json(usecase.execute(&identity, id).await?.into()))
}

pub async fn get_shop_by_code(
    identity: Identity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ShopResponse>, DashboardError> {
    let usecase = GetShopUseCase {
        shops: state.shop_repo(),
    };
    Ok(Json(usecase.by_code(&identity, &code).await?.into()))
}

// ── PUT /shops/{id} ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShopRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub async fn update_shop(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<ShopId>,
    Json(body): Json<UpdateShopRequest>,
) -> Result<Json<ShopResponse>, DashboardError> {
    let usecase = UpdateShopUseCase {
        shops: state.shop_repo(),
    };
    let shop = usecase
        .execute(
            &identity,
            id,
            UpdateShopInput {
                code: body.code,
                name: body.name,
                status: body.status,
                address: body.address,
                city: body.city,
                province: body.province,
                postal_code: body.postal_code,
                contact_name: body.contact_name,
                phone: body.phone,
                email: body.email,
            },
        )
        .await?;
    Ok(Json(shop.into()))
}
