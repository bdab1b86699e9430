use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use havenz_auth_types::identity::Identity;
use havenz_domain::pagination::PageRequest;

use crate::domain::types::{Customer, Insurance, Vehicle, WorkOrderDetail, WorkOrderListItem};
use crate::error::DashboardError;
use crate::handlers::user::ShopSummaryResponse;
use crate::state::AppState;
use crate::usecase::workorder::{
    CreateWorkOrderInput, CreateWorkOrderUseCase, GetWorkOrderUseCase, ListWorkOrdersUseCase,
};

// ── Wire shapes ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBody {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub email: String,
    pub phone: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleBody {
    pub plate_no: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub body_style: String,
    pub model_year: i32,
    pub vin: Option<String>,
    #[serde(default)]
    pub color: String,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceBody {
    pub insurance_company: Option<String>,
    pub agent_first_name: Option<String>,
    pub agent_last_name: Option<String>,
    #[serde(default, skip_deserializing)]
    pub agent_full_name: Option<String>,
    pub agent_phone: Option<String>,
    pub policy_number: Option<String>,
    pub claim_number: Option<String>,
}

impl From<CustomerBody> for Customer {
    fn from(b: CustomerBody) -> Self {
        Self {
            first_name: b.first_name,
            last_name: b.last_name,
            address: b.address,
            city: b.city,
            postal_code: b.postal_code,
            province: b.province,
            email: b.email,
            phone: b.phone,
        }
    }
}

impl From<Customer> for CustomerBody {
    fn from(c: Customer) -> Self {
        Self {
            first_name: c.first_name,
            last_name: c.last_name,
            address: c.address,
            city: c.city,
            postal_code: c.postal_code,
            province: c.province,
            email: c.email,
            phone: c.phone,
        }
    }
}

impl From<VehicleBody> for Vehicle {
    fn from(b: VehicleBody) -> Self {
        Self {
            plate_no: b.plate_no,
            make: b.make,
            model: b.model,
            body_style: b.body_style,
            model_year: b.model_year,
            vin: b.vin,
            color: b.color,
        }
    }
}

impl From<Vehicle> for VehicleBody {
    fn from(v: Vehicle) -> Self {
        Self {
            plate_no: v.plate_no,
            make: v.make,
            model: v.model,
            body_style: v.body_style,
            model_year: v.model_year,
            vin: v.vin,
            color: v.color,
        }
    }
}

impl From<InsuranceBody> for Insurance {
    fn from(b: InsuranceBody) -> Self {
        Self {
            insurance_company: b.insurance_company,
            agent_first_name: b.agent_first_name,
            agent_last_name: b.agent_last_name,
            agent_phone: b.agent_phone,
            policy_number: b.policy_number,
            claim_number: b.claim_number,
        }
    }
}

impl From<Insurance> for InsuranceBody {
    fn from(i: Insurance) -> Self {
        Self {
            agent_full_name: i.agent_full_name(),
            insurance_company: i.insurance_company,
            agent_first_name: i.agent_first_name,
            agent_last_name: i.agent_last_name,
            agent_phone: i.agent_phone,
            policy_number: i.policy_number,
            claim_number: i.claim_number,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderListItemResponse {
    pub id: String,
    pub code: String,
    pub status: &'static str,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub customer_full_name: String,
    pub customer_email: String,
    pub shop: ShopSummaryResponse,
}

impl From<WorkOrderListItem> for WorkOrderListItemResponse {
    fn from(item: WorkOrderListItem) -> Self {
        Self {
            id: item.id.to_string(),
            code: item.code,
            status: item.status.as_str(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            customer_full_name: item.customer_full_name,
            customer_email: item.customer_email,
            shop: item.shop.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDetailResponse {
    pub id: String,
    pub code: String,
    pub status: &'static str,
    pub damage_date: Option<NaiveDate>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "havenz_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub customer: CustomerBody,
    pub vehicle: VehicleBody,
    pub shop: ShopSummaryResponse,
    pub insurance: Option<InsuranceBody>,
}

impl From<WorkOrderDetail> for WorkOrderDetailResponse {
    fn from(detail: WorkOrderDetail) -> Self {
        Self {
            id: detail.id.to_string(),
            code: detail.code,
            status: detail.status.as_str(),
            damage_date: detail.damage_date,
            created_at: detail.created_at,
            updated_at: detail.updated_at,
            customer: detail.customer.into(),
            vehicle: detail.vehicle.into(),
            shop: detail.shop.into(),
            insurance: detail.insurance.map(Into::into),
        }
    }
}

// ── GET /workorders ──────────────────────────────────────────────────────────

pub async fn list_work_orders(
    identity: Identity,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<WorkOrderListItemResponse>>, DashboardError> {
    let usecase = ListWorkOrdersUseCase {
        work_orders: state.work_order_repo(),
    };
    let items = usecase.execute(&identity, page).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

// ── GET /workorders/{code} ───────────────────────────────────────────────────

pub async fn get_work_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<WorkOrderDetailResponse>, DashboardError> {
    let usecase = GetWorkOrderUseCase {
        work_orders: state.work_order_repo(),
    };
    Ok(Json(usecase.execute(&identity, &code).await?.into()))
}

// ── POST /workorders ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkOrderRequest {
    pub shop_code: Option<String>,
    pub damage_date: Option<NaiveDate>,
    pub customer: CustomerBody,
    pub vehicle: VehicleBody,
    pub insurance: Option<InsuranceBody>,
}

pub async fn create_work_order(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateWorkOrderRequest>,
) -> Result<(StatusCode, Json<WorkOrderDetailResponse>), DashboardError> {
    let usecase = CreateWorkOrderUseCase {
        shops: state.shop_repo(),
        work_orders: state.work_order_repo(),
    };
    let detail = usecase
        .execute(
            &identity,
            CreateWorkOrderInput {
                shop_code: body.shop_code,
                damage_date: body.damage_date,
                customer: body.customer.into(),
                vehicle: body.vehicle.into(),
                insurance: body.insurance.map(Into::into),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}
