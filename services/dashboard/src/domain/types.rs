use chrono::{DateTime, NaiveDate, Utc};

use havenz_auth_types::identity::Identity;
use havenz_domain::id::{RoleId, ShopId, UserId, WorkOrderId};
use havenz_domain::role::RoleCode;
use havenz_domain::status::{ShopStatus, WorkOrderStatus};

// ── Users ────────────────────────────────────────────────────────────────────

/// Seeded role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub code: RoleCode,
    pub name: String,
}

/// Shop reference embedded in user and work order reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSummary {
    pub id: ShopId,
    pub code: String,
    pub name: String,
}

/// Persisted dashboard account, with its role and shop resolved.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub external_id: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub token_version: i32,
    pub role: Role,
    pub shop: Option<ShopSummary>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivated_by: Option<UserId>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role_code(&self) -> RoleCode {
        self.role.code
    }

    pub fn shop_id(&self) -> Option<ShopId> {
        self.shop.as_ref().map(|s| s.id)
    }

    /// Request-scoped identity for this record.
    pub fn to_identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            external_id: self.external_id.clone(),
            role: self.role.code,
            shop_id: self.shop_id(),
            token_version: self.token_version,
            is_active: self.is_active,
        }
    }
}

/// Insert payload for a freshly provisioned account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub external_id: String,
    pub role_id: RoleId,
    pub shop_id: Option<ShopId>,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub role_id: Option<RoleId>,
    pub shop_id: Option<ShopId>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ── Shops ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Shop {
    pub id: ShopId,
    pub code: String,
    pub name: String,
    pub status: ShopStatus,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    pub fn summary(&self) -> ShopSummary {
        ShopSummary {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

// ── Work orders ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub plate_no: String,
    pub make: String,
    pub model: String,
    pub body_style: String,
    pub model_year: i32,
    pub vin: Option<String>,
    pub color: String,
}

/// Insurance details. Blank fields are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insurance {
    pub insurance_company: Option<String>,
    pub agent_first_name: Option<String>,
    pub agent_last_name: Option<String>,
    pub agent_phone: Option<String>,
    pub policy_number: Option<String>,
    pub claim_number: Option<String>,
}

impl Insurance {
    pub fn agent_full_name(&self) -> Option<String> {
        match (&self.agent_first_name, &self.agent_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

/// Everything written by one intake transaction.
#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub id: WorkOrderId,
    pub code: String,
    pub shop_id: ShopId,
    pub created_by: UserId,
    pub status: WorkOrderStatus,
    pub damage_date: Option<NaiveDate>,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub insurance: Option<Insurance>,
}

#[derive(Debug, Clone)]
pub struct WorkOrderListItem {
    pub id: WorkOrderId,
    pub code: String,
    pub status: WorkOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_full_name: String,
    pub customer_email: String,
    pub shop: ShopSummary,
}

#[derive(Debug, Clone)]
pub struct WorkOrderDetail {
    pub id: WorkOrderId,
    pub code: String,
    pub status: WorkOrderStatus,
    pub damage_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub shop: ShopSummary,
    pub insurance: Option<Insurance>,
}

impl WorkOrderDetail {
    pub fn list_item(&self) -> WorkOrderListItem {
        WorkOrderListItem {
            id: self.id,
            code: self.code.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            customer_full_name: self.customer.full_name(),
            customer_email: self.customer.email.clone(),
            shop: self.shop.clone(),
        }
    }
}
