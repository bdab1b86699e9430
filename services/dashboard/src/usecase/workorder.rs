use chrono::{Datelike, NaiveDate, Utc};
use rand::RngExt;
use tracing::{info, warn};

use havenz_auth_types::identity::Identity;
use havenz_domain::id::WorkOrderId;
use havenz_domain::pagination::PageRequest;
use havenz_domain::status::WorkOrderStatus;

use crate::domain::policy;
use crate::domain::repository::{ShopRepository, WorkOrderRepository};
use crate::domain::types::{
    Customer, Insurance, NewWorkOrder, Vehicle, WorkOrderDetail, WorkOrderListItem,
};
use crate::domain::validate;
use crate::error::DashboardError;

/// Work order codes are `WO-` followed by this many characters from [`CHARSET`].
pub const CODE_SUFFIX_LEN: usize = 8;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Attempts at a fresh code before a collision is reported.
const CODE_ATTEMPTS: usize = 3;

fn generate_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    format!("WO-{suffix}")
}

// ── ListWorkOrders ───────────────────────────────────────────────────────────

pub struct ListWorkOrdersUseCase<W: WorkOrderRepository> {
    pub work_orders: W,
}

impl<W: WorkOrderRepository> ListWorkOrdersUseCase<W> {
    pub async fn execute(
        &self,
        actor: &Identity,
        page: PageRequest,
    ) -> Result<Vec<WorkOrderListItem>, DashboardError> {
        let scope = policy::shop_scope(actor)?;
        self.work_orders.list(scope, page.clamped()).await
    }
}

// ── GetWorkOrder ─────────────────────────────────────────────────────────────

pub struct GetWorkOrderUseCase<W: WorkOrderRepository> {
    pub work_orders: W,
}

impl<W: WorkOrderRepository> GetWorkOrderUseCase<W> {
    /// Orders outside the actor's shop are reported as missing.
    pub async fn execute(
        &self,
        actor: &Identity,
        code: &str,
    ) -> Result<WorkOrderDetail, DashboardError> {
        let scope = policy::shop_scope(actor)?;
        self.work_orders
            .find_by_code(scope, &validate::normalize_code(code))
            .await?
            .ok_or(DashboardError::WorkOrderNotFound)
    }
}

// ── CreateWorkOrder ──────────────────────────────────────────────────────────

/// Intake payload. Fields are raw; normalization happens in the usecase.
pub struct CreateWorkOrderInput {
    pub shop_code: Option<String>,
    pub damage_date: Option<NaiveDate>,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub insurance: Option<Insurance>,
}

pub struct CreateWorkOrderUseCase<S, W>
where
    S: ShopRepository,
    W: WorkOrderRepository,
{
    pub shops: S,
    pub work_orders: W,
}

impl<S, W> CreateWorkOrderUseCase<S, W>
where
    S: ShopRepository,
    W: WorkOrderRepository,
{
    pub async fn execute(
        &self,
        actor: &Identity,
        input: CreateWorkOrderInput,
    ) -> Result<WorkOrderDetail, DashboardError> {
        // 1. Owning shop comes from the actor
        policy::shop_scope(actor)?;
        let requested = match validate::trim_opt(input.shop_code) {
            Some(code) => Some(
                self.shops
                    .find_by_code(&validate::normalize_code(&code))
                    .await?
                    .ok_or_else(|| DashboardError::validation("shopCode", "invalid shop code"))?
                    .id,
            ),
            None => None,
        };
        let shop_id = policy::owning_shop(actor, requested)?;

        // 2. Intake records
        let customer = normalize_customer(input.customer)?;
        let vehicle = normalize_vehicle(input.vehicle)?;
        let insurance = input.insurance.map(normalize_insurance).transpose()?.flatten();

        // 3. Insert, retrying on a code collision
        let mut order = NewWorkOrder {
            id: WorkOrderId::new(),
            code: generate_code(),
            shop_id,
            created_by: actor.id,
            status: WorkOrderStatus::default(),
            damage_date: input.damage_date,
            customer,
            vehicle,
            insurance,
        };
        let mut attempt = 1;
        loop {
            match self.work_orders.create(&order).await {
                Ok(detail) => {
                    info!(
                        code = %detail.code,
                        shop_id = %shop_id,
                        created_by = %actor.id,
                        "work order created"
                    );
                    return Ok(detail);
                }
                Err(DashboardError::WorkOrderAlreadyExists) if attempt < CODE_ATTEMPTS => {
                    warn!(code = %order.code, attempt, "work order code collision");
                    order.code = generate_code();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, DashboardError> {
    let value = value.trim();
    validate::require(field, value)?;
    Ok(value.to_owned())
}

fn normalize_customer(raw: Customer) -> Result<Customer, DashboardError> {
    let email = validate::normalize_email(&raw.email);
    validate::email("customer.email", &email)?;
    let phone = raw.phone.trim().to_owned();
    validate::phone("customer.phone", &phone)?;
    let postal_code = validate::normalize_postal_code(&raw.postal_code);
    validate::postal_code("customer.postalCode", &postal_code)?;
    let province = validate::normalize_code(&raw.province);
    validate::province("customer.province", &province)?;
    Ok(Customer {
        first_name: required("customer.firstName", &raw.first_name)?,
        last_name: required("customer.lastName", &raw.last_name)?,
        address: required("customer.address", &raw.address)?,
        city: required("customer.city", &raw.city)?,
        postal_code,
        province,
        email,
        phone,
    })
}

fn normalize_vehicle(raw: Vehicle) -> Result<Vehicle, DashboardError> {
    let latest = Utc::now().year() + 1;
    if !(1900..=latest).contains(&raw.model_year) {
        return Err(DashboardError::validation(
            "vehicle.modelYear",
            format!("must be between 1900 and {latest}"),
        ));
    }
    let vin = validate::trim_opt(raw.vin).map(|v| v.to_uppercase());
    if let Some(ref vin) = vin {
        validate::vin("vehicle.vin", vin)?;
    }
    Ok(Vehicle {
        plate_no: required("vehicle.plateNo", &raw.plate_no)?.to_uppercase(),
        make: required("vehicle.make", &raw.make)?,
        model: required("vehicle.model", &raw.model)?,
        body_style: raw.body_style.trim().to_owned(),
        model_year: raw.model_year,
        vin,
        color: raw.color.trim().to_owned(),
    })
}

/// All-blank insurance is dropped. Otherwise the company is required.
fn normalize_insurance(raw: Insurance) -> Result<Option<Insurance>, DashboardError> {
    let insurance = Insurance {
        insurance_company: validate::trim_opt(raw.insurance_company),
        agent_first_name: validate::trim_opt(raw.agent_first_name),
        agent_last_name: validate::trim_opt(raw.agent_last_name),
        agent_phone: validate::trim_opt(raw.agent_phone),
        policy_number: validate::trim_opt(raw.policy_number),
        claim_number: validate::trim_opt(raw.claim_number),
    };
    if insurance == Insurance::default() {
        return Ok(None);
    }
    if insurance.insurance_company.is_none() {
        return Err(DashboardError::validation(
            "insurance.insuranceCompany",
            "cannot be blank",
        ));
    }
    if let Some(ref phone) = insurance.agent_phone {
        validate::phone("insurance.agentPhone", phone)?;
    }
    Ok(Some(insurance))
}
