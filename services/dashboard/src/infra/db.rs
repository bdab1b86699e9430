use std::collections::HashMap;

use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr,
    TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use havenz_dashboard_schema::{customers, insurance, roles, shops, users, vehicles, work_orders};
use havenz_domain::id::{RoleId, ShopId, UserId, WorkOrderId};
use havenz_domain::pagination::PageRequest;
use havenz_domain::role::RoleCode;
use havenz_domain::status::{ShopStatus, WorkOrderStatus};

use crate::domain::policy::{ShopScope, UserVisibility};
use crate::domain::repository::{ShopRepository, UserRepository, WorkOrderRepository};
use crate::domain::types::{
    Customer, Insurance, NewUser, NewWorkOrder, Role, Shop, ShopSummary, User, UserUpdate,
    Vehicle, WorkOrderDetail, WorkOrderListItem,
};
use crate::error::DashboardError;

/// Constraint violations become domain errors; everything else is internal with `context`.
fn map_db_err(
    err: DbErr,
    conflict: DashboardError,
    reference_field: &'static str,
    context: &'static str,
) -> DashboardError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            DashboardError::validation(reference_field, "references a record that does not exist")
        }
        _ => anyhow::Error::new(err).context(context).into(),
    }
}

fn flatten_txn(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    /// Attach role and shop summary to raw rows.
    async fn hydrate(&self, models: Vec<users::Model>) -> Result<Vec<User>, DashboardError> {
        let roles: HashMap<Uuid, roles::Model> = roles::Entity::find()
            .all(&self.db)
            .await
            .context("load roles")?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        let shop_ids: Vec<Uuid> = models.iter().filter_map(|m| m.shop_id).collect();
        let shops: HashMap<Uuid, shops::Model> = if shop_ids.is_empty() {
            HashMap::new()
        } else {
            shops::Entity::find()
                .filter(shops::Column::Id.is_in(shop_ids))
                .all(&self.db)
                .await
                .context("load user shops")?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        };

        models
            .into_iter()
            .map(|model| {
                let role = roles
                    .get(&model.role_id)
                    .ok_or_else(|| anyhow!("user {} references unknown role {}", model.id, model.role_id))?;
                let role = role_from_model(role)?;
                let shop = model
                    .shop_id
                    .and_then(|id| shops.get(&id))
                    .map(shop_summary_from_model);
                Ok(user_from_model(model, role, shop))
            })
            .collect()
    }

    async fn load(&self, id: UserId) -> Result<User, DashboardError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?
            .ok_or(DashboardError::UserNotFound)?;
        self.hydrate_one(model).await
    }

    async fn hydrate_one(&self, model: users::Model) -> Result<User, DashboardError> {
        self.hydrate(vec![model])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("hydrate returned no user").into())
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DashboardError> {
        match self.load(id).await {
            Ok(user) => Ok(Some(user)),
            Err(DashboardError::UserNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DashboardError> {
        let model = users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .context("find user by external id")?;
        match model {
            Some(model) => Ok(Some(self.hydrate_one(model).await?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        visibility: &UserVisibility,
        page: PageRequest,
    ) -> Result<Vec<User>, DashboardError> {
        let condition = match visibility {
            UserVisibility::Everyone => Condition::all(),
            UserVisibility::AdminView { shop } => {
                let mut any = Condition::any().add(roles::Column::Code.eq(RoleCode::Admin.code()));
                if let Some(shop) = shop {
                    any = any.add(
                        Condition::all()
                            .add(roles::Column::Code.is_in([
                                RoleCode::Adjuster.code(),
                                RoleCode::Bodyman.code(),
                            ]))
                            .add(users::Column::ShopId.eq(shop.0)),
                    );
                }
                any
            }
        };
        let models = users::Entity::find()
            .join(JoinType::InnerJoin, users::Relation::Role.def())
            .filter(condition)
            .order_by_desc(users::Column::CreatedAt)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .context("list users")?;
        self.hydrate(models).await
    }

    async fn find_role(&self, code: RoleCode) -> Result<Option<Role>, DashboardError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Code.eq(code.code()))
            .one(&self.db)
            .await
            .context("find role by code")?;
        model.as_ref().map(role_from_model).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, DashboardError> {
        let now = Utc::now();
        let model = users::ActiveModel {
            id: Set(user.id.0),
            email: Set(user.email.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            phone: Set(user.phone.clone()),
            image_url: Set(user.image_url.clone()),
            external_id: Set(user.external_id.clone()),
            email_verified: Set(false),
            is_active: Set(true),
            token_version: Set(0),
            role_id: Set(user.role_id.0),
            shop_id: Set(user.shop_id.map(|s| s.0)),
            deactivated_at: Set(None),
            deactivated_by: Set(None),
            last_sign_in_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_db_err(e, DashboardError::UserAlreadyExists, "shopCode", "create user"))?;
        self.hydrate_one(model).await
    }

    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, DashboardError> {
        let mut am = users::ActiveModel {
            id: Set(id.0),
            ..Default::default()
        };
        if let Some(ref v) = update.first_name {
            am.first_name = Set(v.clone());
        }
        if let Some(ref v) = update.last_name {
            am.last_name = Set(v.clone());
        }
        if let Some(ref v) = update.phone {
            am.phone = Set(Some(v.clone()));
        }
        if let Some(ref v) = update.image_url {
            am.image_url = Set(Some(v.clone()));
        }
        if let Some(role_id) = update.role_id {
            am.role_id = Set(role_id.0);
        }
        if let Some(shop_id) = update.shop_id {
            am.shop_id = Set(Some(shop_id.0));
        }
        am.updated_at = Set(Utc::now());
        match am.update(&self.db).await {
            Ok(model) => self.hydrate_one(model).await,
            Err(DbErr::RecordNotUpdated) => Err(DashboardError::UserNotFound),
            Err(e) => Err(map_db_err(e, DashboardError::UserAlreadyExists, "shopCode", "update user")),
        }
    }

    async fn deactivate(&self, id: UserId, by: UserId) -> Result<User, DashboardError> {
        let now = Utc::now();
        users::Entity::update_many()
            .col_expr(users::Column::IsActive, Expr::value(false))
            .col_expr(users::Column::DeactivatedAt, Expr::value(now))
            .col_expr(users::Column::DeactivatedBy, Expr::value(by.0))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id.0))
            .filter(users::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .context("deactivate user")?;
        self.load(id).await
    }

    async fn reactivate(&self, id: UserId) -> Result<User, DashboardError> {
        users::Entity::update_many()
            .col_expr(users::Column::IsActive, Expr::value(true))
            .col_expr(users::Column::DeactivatedAt, Expr::value(Option::<chrono::DateTime<Utc>>::None))
            .col_expr(users::Column::DeactivatedBy, Expr::value(Option::<Uuid>::None))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.0))
            .filter(users::Column::IsActive.eq(false))
            .exec(&self.db)
            .await
            .context("reactivate user")?;
        self.load(id).await
    }

    async fn increment_token_version(&self, id: UserId) -> Result<User, DashboardError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::TokenVersion,
                Expr::col(users::Column::TokenVersion).add(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("increment token version")?;
        if result.rows_affected == 0 {
            return Err(DashboardError::UserNotFound);
        }
        self.load(id).await
    }

    async fn touch_last_sign_in(&self, id: UserId) -> Result<(), DashboardError> {
        users::Entity::update_many()
            .col_expr(users::Column::LastSignInAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("touch last sign-in")?;
        Ok(())
    }

    async fn mark_email_verified(&self, id: UserId) -> Result<(), DashboardError> {
        users::Entity::update_many()
            .col_expr(users::Column::EmailVerified, Expr::value(true))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("mark email verified")?;
        Ok(())
    }
}

fn role_from_model(model: &roles::Model) -> Result<Role, DashboardError> {
    let code = RoleCode::from_code(&model.code)
        .ok_or_else(|| anyhow!("unknown role code {:?} in roles table", model.code))?;
    Ok(Role {
        id: RoleId(model.id),
        code,
        name: model.name.clone(),
    })
}

fn shop_summary_from_model(model: &shops::Model) -> ShopSummary {
    ShopSummary {
        id: ShopId(model.id),
        code: model.code.clone(),
        name: model.shop_name.clone(),
    }
}

fn user_from_model(model: users::Model, role: Role, shop: Option<ShopSummary>) -> User {
    User {
        id: UserId(model.id),
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        phone: model.phone,
        image_url: model.image_url,
        external_id: model.external_id,
        email_verified: model.email_verified,
        is_active: model.is_active,
        token_version: model.token_version,
        role,
        shop,
        deactivated_at: model.deactivated_at,
        deactivated_by: model.deactivated_by.map(UserId),
        last_sign_in_at: model.last_sign_in_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Shop repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbShopRepository {
    pub db: DatabaseConnection,
}

impl ShopRepository for DbShopRepository {
    async fn find_by_id(&self, id: ShopId) -> Result<Option<Shop>, DashboardError> {
        let model = shops::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find shop by id")?;
        model.map(shop_from_model).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Shop>, DashboardError> {
        let model = shops::Entity::find()
            .filter(shops::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find shop by code")?;
        model.map(shop_from_model).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Shop>, DashboardError> {
        shops::Entity::find()
            .order_by_desc(shops::Column::CreatedAt)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .context("list shops")?
            .into_iter()
            .map(shop_from_model)
            .collect()
    }

    async fn create(&self, shop: &Shop) -> Result<(), DashboardError> {
        shop_to_active_model(shop)
            .insert(&self.db)
            .await
            .map_err(|e| map_db_err(e, DashboardError::ShopAlreadyExists, "code", "create shop"))?;
        Ok(())
    }

    async fn update(&self, shop: &Shop) -> Result<(), DashboardError> {
        match shop_to_active_model(shop).update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(DashboardError::ShopNotFound),
            Err(e) => Err(map_db_err(e, DashboardError::ShopAlreadyExists, "code", "update shop")),
        }
    }
}

fn shop_to_active_model(shop: &Shop) -> shops::ActiveModel {
    shops::ActiveModel {
        id: Set(shop.id.0),
        code: Set(shop.code.clone()),
        shop_name: Set(shop.name.clone()),
        status: Set(shop.status.as_str().to_owned()),
        address: Set(shop.address.clone()),
        city: Set(shop.city.clone()),
        province: Set(shop.province.clone()),
        postal_code: Set(shop.postal_code.clone()),
        contact_name: Set(shop.contact_name.clone()),
        phone: Set(shop.phone.clone()),
        email: Set(shop.email.clone()),
        created_at: Set(shop.created_at),
        updated_at: Set(shop.updated_at),
    }
}

fn shop_from_model(model: shops::Model) -> Result<Shop, DashboardError> {
    let status = ShopStatus::parse(&model.status)
        .ok_or_else(|| anyhow!("unknown shop status {:?} for shop {}", model.status, model.id))?;
    Ok(Shop {
        id: ShopId(model.id),
        code: model.code,
        name: model.shop_name,
        status,
        address: model.address,
        city: model.city,
        province: model.province,
        postal_code: model.postal_code,
        contact_name: model.contact_name,
        phone: model.phone,
        email: model.email,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Work order repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbWorkOrderRepository {
    pub db: DatabaseConnection,
}

fn scoped(scope: ShopScope) -> Condition {
    match scope {
        ShopScope::All => Condition::all(),
        ShopScope::Shop(id) => Condition::all().add(work_orders::Column::ShopId.eq(id.0)),
    }
}

fn parse_status(raw: &str) -> Result<WorkOrderStatus, DashboardError> {
    WorkOrderStatus::parse(raw)
        .ok_or_else(|| anyhow!("unknown work order status {raw:?}").into())
}

impl WorkOrderRepository for DbWorkOrderRepository {
    async fn list(
        &self,
        scope: ShopScope,
        page: PageRequest,
    ) -> Result<Vec<WorkOrderListItem>, DashboardError> {
        let rows = work_orders::Entity::find()
            .filter(scoped(scope))
            .find_also_related(customers::Entity)
            .order_by_desc(work_orders::Column::CreatedAt)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .context("list work orders")?;

        let shop_ids: Vec<Uuid> = rows.iter().map(|(wo, _)| wo.shop_id).collect();
        let shops: HashMap<Uuid, ShopSummary> = if shop_ids.is_empty() {
            HashMap::new()
        } else {
            shops::Entity::find()
                .filter(shops::Column::Id.is_in(shop_ids))
                .all(&self.db)
                .await
                .context("load work order shops")?
                .iter()
                .map(|s| (s.id, shop_summary_from_model(s)))
                .collect()
        };

        rows.into_iter()
            .map(|(wo, customer)| {
                let customer =
                    customer.ok_or_else(|| anyhow!("work order {} has no customer", wo.code))?;
                let shop = shops
                    .get(&wo.shop_id)
                    .cloned()
                    .ok_or_else(|| anyhow!("work order {} has no shop", wo.code))?;
                Ok(WorkOrderListItem {
                    id: WorkOrderId(wo.id),
                    code: wo.code,
                    status: parse_status(&wo.status)?,
                    created_at: wo.created_at,
                    updated_at: wo.updated_at,
                    customer_full_name: format!("{} {}", customer.first_name, customer.last_name),
                    customer_email: customer.email,
                    shop,
                })
            })
            .collect()
    }

    async fn find_by_code(
        &self,
        scope: ShopScope,
        code: &str,
    ) -> Result<Option<WorkOrderDetail>, DashboardError> {
        let Some(wo) = work_orders::Entity::find()
            .filter(work_orders::Column::Code.eq(code))
            .filter(scoped(scope))
            .one(&self.db)
            .await
            .context("find work order by code")?
        else {
            return Ok(None);
        };

        let customer = customers::Entity::find_by_id(wo.customer_id)
            .one(&self.db)
            .await
            .context("load work order customer")?
            .ok_or_else(|| anyhow!("work order {} has no customer", wo.code))?;
        let vehicle = vehicles::Entity::find_by_id(wo.vehicle_id)
            .one(&self.db)
            .await
            .context("load work order vehicle")?
            .ok_or_else(|| anyhow!("work order {} has no vehicle", wo.code))?;
        let shop = shops::Entity::find_by_id(wo.shop_id)
            .one(&self.db)
            .await
            .context("load work order shop")?
            .ok_or_else(|| anyhow!("work order {} has no shop", wo.code))?;
        let insurance = insurance::Entity::find_by_id(wo.id)
            .one(&self.db)
            .await
            .context("load work order insurance")?;

        Ok(Some(WorkOrderDetail {
            id: WorkOrderId(wo.id),
            status: parse_status(&wo.status)?,
            code: wo.code,
            damage_date: wo.damage_date,
            created_at: wo.created_at,
            updated_at: wo.updated_at,
            customer: customer_from_model(customer),
            vehicle: vehicle_from_model(vehicle),
            shop: shop_summary_from_model(&shop),
            insurance: insurance.map(insurance_from_model),
        }))
    }

    async fn create(&self, order: &NewWorkOrder) -> Result<WorkOrderDetail, DashboardError> {
        let now = Utc::now();
        let shop = shops::Entity::find_by_id(order.shop_id.0)
            .one(&self.db)
            .await
            .context("load work order shop")?
            .ok_or_else(|| DashboardError::validation("shopCode", "invalid shop code"))?;

        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let order = order.clone();
                Box::pin(async move {
                    let customer_id = Uuid::now_v7();
                    let vehicle_id = Uuid::now_v7();
                    let c = &order.customer;
                    customers::ActiveModel {
                        id: Set(customer_id),
                        first_name: Set(c.first_name.clone()),
                        last_name: Set(c.last_name.clone()),
                        address: Set(c.address.clone()),
                        city: Set(c.city.clone()),
                        postal_code: Set(c.postal_code.clone()),
                        province: Set(c.province.clone()),
                        email: Set(c.email.clone()),
                        phone: Set(c.phone.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    let v = &order.vehicle;
                    vehicles::ActiveModel {
                        id: Set(vehicle_id),
                        plate_number: Set(v.plate_no.clone()),
                        make: Set(v.make.clone()),
                        model: Set(v.model.clone()),
                        body_style: Set(v.body_style.clone()),
                        model_year: Set(v.model_year),
                        vin: Set(v.vin.clone()),
                        color: Set(v.color.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    work_orders::ActiveModel {
                        id: Set(order.id.0),
                        code: Set(order.code.clone()),
                        customer_id: Set(customer_id),
                        vehicle_id: Set(vehicle_id),
                        shop_id: Set(order.shop_id.0),
                        created_by_user_id: Set(order.created_by.0),
                        status: Set(order.status.as_str().to_owned()),
                        damage_date: Set(order.damage_date),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    if let Some(ref ins) = order.insurance {
                        insurance::Entity::insert(insurance::ActiveModel {
                            work_order_id: Set(order.id.0),
                            insurance_company: Set(ins.insurance_company.clone()),
                            agent_first_name: Set(ins.agent_first_name.clone()),
                            agent_last_name: Set(ins.agent_last_name.clone()),
                            agent_phone: Set(ins.agent_phone.clone()),
                            policy_number: Set(ins.policy_number.clone()),
                            claim_number: Set(ins.claim_number.clone()),
                        })
                        .on_conflict(
                            OnConflict::column(insurance::Column::WorkOrderId)
                                .update_columns([
                                    insurance::Column::InsuranceCompany,
                                    insurance::Column::AgentFirstName,
                                    insurance::Column::AgentLastName,
                                    insurance::Column::AgentPhone,
                                    insurance::Column::PolicyNumber,
                                    insurance::Column::ClaimNumber,
                                ])
                                .to_owned(),
                        )
                        .exec(txn)
                        .await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| {
                map_db_err(
                    flatten_txn(e),
                    DashboardError::WorkOrderAlreadyExists,
                    "shopCode",
                    "create work order",
                )
            })?;

        Ok(WorkOrderDetail {
            id: order.id,
            code: order.code.clone(),
            status: order.status,
            damage_date: order.damage_date,
            created_at: now,
            updated_at: now,
            customer: order.customer.clone(),
            vehicle: order.vehicle.clone(),
            shop: shop_summary_from_model(&shop),
            insurance: order.insurance.clone(),
        })
    }
}

fn customer_from_model(model: customers::Model) -> Customer {
    Customer {
        first_name: model.first_name,
        last_name: model.last_name,
        address: model.address,
        city: model.city,
        postal_code: model.postal_code,
        province: model.province,
        email: model.email,
        phone: model.phone,
    }
}

fn vehicle_from_model(model: vehicles::Model) -> Vehicle {
    Vehicle {
        plate_no: model.plate_number,
        make: model.make,
        model: model.model,
        body_style: model.body_style,
        model_year: model.model_year,
        vin: model.vin,
        color: model.color,
    }
}

fn insurance_from_model(model: insurance::Model) -> Insurance {
    Insurance {
        insurance_company: model.insurance_company,
        agent_first_name: model.agent_first_name,
        agent_last_name: model.agent_last_name,
        agent_phone: model.agent_phone,
        policy_number: model.policy_number,
        claim_number: model.claim_number,
    }
}
