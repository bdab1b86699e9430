use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use havenz_auth_types::identity::Identity;
use havenz_domain::id::{RoleId, ShopId, UserId};
use havenz_domain::pagination::PageRequest;
use havenz_domain::role::RoleCode;
use havenz_domain::status::ShopStatus;
use havenz_testing::auth::MockAuth;

use havenz_dashboard::domain::policy::{ShopScope, UserVisibility};
use havenz_dashboard::domain::repository::{
    EmailSender, IdentityDirectory, ShopRepository, UserRepository, WorkOrderRepository,
};
use havenz_dashboard::domain::types::{
    Customer, Insurance, NewUser, NewWorkOrder, Role, Shop, ShopSummary, User, UserUpdate, Vehicle,
    WorkOrderDetail, WorkOrderListItem,
};
use havenz_dashboard::error::DashboardError;
use havenz_dashboard::infra::identity::JwtTokenVerifier;

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Seeded role row with a stable id per code.
pub fn role(code: RoleCode) -> Role {
    let index = RoleCode::ALL.iter().position(|c| *c == code).unwrap_or(0);
    Role {
        id: RoleId(Uuid::from_u128(index as u128 + 1)),
        code,
        name: code.name().to_owned(),
    }
}

fn role_by_id(id: RoleId) -> Role {
    RoleCode::ALL
        .into_iter()
        .map(role)
        .find(|r| r.id == id)
        .unwrap()
}

pub fn test_shop(code: &str) -> Shop {
    let now = Utc::now();
    Shop {
        id: ShopId::new(),
        code: code.to_owned(),
        name: format!("{code} Collision"),
        status: ShopStatus::Active,
        address: "100 Main St".into(),
        city: "Calgary".into(),
        province: "AB".into(),
        postal_code: "T2P1J9".into(),
        contact_name: "Pat Lee".into(),
        phone: "403-555-0100".into(),
        email: format!("{}@shops.test", code.to_lowercase()),
        created_at: now,
        updated_at: now,
    }
}

/// Active, verified user. Creation times increase with every call so list order is stable.
pub fn test_user(code: RoleCode, shop: Option<&Shop>) -> User {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let seq = SEQ.fetch_add(1, Ordering::SeqCst) as i64;
    let id = UserId::new();
    let created = Utc::now() - Duration::hours(1) + Duration::milliseconds(seq);
    User {
        id,
        email: format!("{}-{seq}@havenz.test", code.code()),
        first_name: "Sam".into(),
        last_name: format!("User{seq}"),
        phone: None,
        image_url: None,
        external_id: format!("ext-{id}"),
        email_verified: true,
        is_active: true,
        token_version: 0,
        role: role(code),
        shop: shop.map(Shop::summary),
        deactivated_at: None,
        deactivated_by: None,
        last_sign_in_at: None,
        created_at: created,
        updated_at: created,
    }
}

/// Identity of a stored user, as the resolver would build it.
pub fn identity_of(user: &User) -> Identity {
    user.to_identity()
}

pub fn actor(code: RoleCode, shop: Option<&Shop>) -> Identity {
    MockAuth::identity(code, shop.map(|s| s.id))
}

pub fn test_customer() -> Customer {
    Customer {
        first_name: " Jane ".into(),
        last_name: "Doe".into(),
        address: "12 Elm St".into(),
        city: "Edmonton".into(),
        postal_code: "t5j 0n3".into(),
        province: "ab".into(),
        email: " Jane.Doe@Example.com ".into(),
        phone: "780-555-0199".into(),
    }
}

pub fn test_vehicle() -> Vehicle {
    Vehicle {
        plate_no: "bxr 442".into(),
        make: "Toyota".into(),
        model: "Corolla".into(),
        body_style: "Sedan".into(),
        model_year: 2019,
        vin: Some("2t1bu4ee9dc123456".into()),
        color: "Silver".into(),
    }
}

pub fn damage_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()
}

pub fn verifier() -> JwtTokenVerifier {
    JwtTokenVerifier::from_verifier(MockAuth::verifier())
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub shops: Arc<Mutex<Vec<ShopSummary>>>,
    pub fail_lookups: bool,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>, shops: &[Shop]) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            shops: Arc::new(Mutex::new(shops.iter().map(Shop::summary).collect())),
            fail_lookups: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![], &[])
    }

    /// Every lookup fails as if the database were down.
    pub fn failing() -> Self {
        Self {
            fail_lookups: true,
            ..Self::empty()
        }
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn modify(&self, id: UserId, f: impl FnOnce(&mut User)) -> Result<User, DashboardError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DashboardError::UserNotFound)?;
        f(user);
        Ok(user.clone())
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DashboardError> {
        if self.fail_lookups {
            return Err(anyhow::anyhow!("connection refused").into());
        }
        Ok(self.get(id))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DashboardError> {
        if self.fail_lookups {
            return Err(anyhow::anyhow!("connection refused").into());
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn list(
        &self,
        visibility: &UserVisibility,
        page: PageRequest,
    ) -> Result<Vec<User>, DashboardError> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| visibility.admits(u))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn find_role(&self, code: RoleCode) -> Result<Option<Role>, DashboardError> {
        Ok(Some(role(code)))
    }

    async fn create(&self, new: &NewUser) -> Result<User, DashboardError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == new.email || u.external_id == new.external_id)
        {
            return Err(DashboardError::UserAlreadyExists);
        }
        let shop = new.shop_id.and_then(|id| {
            self.shops
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
        });
        let now = Utc::now();
        let user = User {
            id: new.id,
            email: new.email.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            phone: new.phone.clone(),
            image_url: new.image_url.clone(),
            external_id: new.external_id.clone(),
            email_verified: false,
            is_active: true,
            token_version: 0,
            role: role_by_id(new.role_id),
            shop,
            deactivated_at: None,
            deactivated_by: None,
            last_sign_in_at: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, DashboardError> {
        let shop = update.shop_id.and_then(|id| {
            self.shops
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
        });
        self.modify(id, |u| {
            if let Some(ref v) = update.first_name {
                u.first_name = v.clone();
            }
            if let Some(ref v) = update.last_name {
                u.last_name = v.clone();
            }
            if update.phone.is_some() {
                u.phone = update.phone.clone();
            }
            if update.image_url.is_some() {
                u.image_url = update.image_url.clone();
            }
            if let Some(role_id) = update.role_id {
                u.role = role_by_id(role_id);
            }
            if shop.is_some() {
                u.shop = shop;
            }
            u.updated_at = Utc::now();
        })
    }

    async fn deactivate(&self, id: UserId, by: UserId) -> Result<User, DashboardError> {
        self.modify(id, |u| {
            if u.is_active {
                u.is_active = false;
                u.deactivated_at = Some(Utc::now());
                u.deactivated_by = Some(by);
            }
        })
    }

    async fn reactivate(&self, id: UserId) -> Result<User, DashboardError> {
        self.modify(id, |u| {
            if !u.is_active {
                u.is_active = true;
                u.deactivated_at = None;
                u.deactivated_by = None;
            }
        })
    }

    async fn increment_token_version(&self, id: UserId) -> Result<User, DashboardError> {
        self.modify(id, |u| u.token_version += 1)
    }

    async fn touch_last_sign_in(&self, id: UserId) -> Result<(), DashboardError> {
        self.modify(id, |u| u.last_sign_in_at = Some(Utc::now()))?;
        Ok(())
    }

    async fn mark_email_verified(&self, id: UserId) -> Result<(), DashboardError> {
        self.modify(id, |u| u.email_verified = true)?;
        Ok(())
    }
}

// ── MockShopRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockShopRepo {
    pub shops: Arc<Mutex<Vec<Shop>>>,
}

impl MockShopRepo {
    pub fn new(shops: Vec<Shop>) -> Self {
        Self {
            shops: Arc::new(Mutex::new(shops)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl ShopRepository for MockShopRepo {
    async fn find_by_id(&self, id: ShopId) -> Result<Option<Shop>, DashboardError> {
        Ok(self.shops.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Shop>, DashboardError> {
        Ok(self
            .shops
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.code == code)
            .cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Shop>, DashboardError> {
        Ok(self
            .shops
            .lock()
            .unwrap()
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, shop: &Shop) -> Result<(), DashboardError> {
        let mut shops = self.shops.lock().unwrap();
        if shops.iter().any(|s| s.code == shop.code) {
            return Err(DashboardError::ShopAlreadyExists);
        }
        shops.push(shop.clone());
        Ok(())
    }

    async fn update(&self, shop: &Shop) -> Result<(), DashboardError> {
        let mut shops = self.shops.lock().unwrap();
        if shops.iter().any(|s| s.code == shop.code && s.id != shop.id) {
            return Err(DashboardError::ShopAlreadyExists);
        }
        let stored = shops
            .iter_mut()
            .find(|s| s.id == shop.id)
            .ok_or(DashboardError::ShopNotFound)?;
        *stored = shop.clone();
        Ok(())
    }
}

// ── MockWorkOrderRepo ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockWorkOrderRepo {
    pub orders: Arc<Mutex<Vec<WorkOrderDetail>>>,
    pub shops: Vec<ShopSummary>,
    /// Inserts that still fail with a code collision before one succeeds.
    pub collisions: Arc<AtomicUsize>,
    pub attempted_codes: Arc<Mutex<Vec<String>>>,
}

impl MockWorkOrderRepo {
    pub fn new(shops: &[Shop]) -> Self {
        Self {
            orders: Arc::new(Mutex::new(vec![])),
            shops: shops.iter().map(Shop::summary).collect(),
            collisions: Arc::new(AtomicUsize::new(0)),
            attempted_codes: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn with_collisions(self, n: usize) -> Self {
        self.collisions.store(n, Ordering::SeqCst);
        self
    }
}

impl WorkOrderRepository for MockWorkOrderRepo {
    async fn list(
        &self,
        scope: ShopScope,
        page: PageRequest,
    ) -> Result<Vec<WorkOrderListItem>, DashboardError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| scope.admits(o.shop.id))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(WorkOrderDetail::list_item)
            .collect())
    }

    async fn find_by_code(
        &self,
        scope: ShopScope,
        code: &str,
    ) -> Result<Option<WorkOrderDetail>, DashboardError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.code == code && scope.admits(o.shop.id))
            .cloned())
    }

    async fn create(&self, order: &NewWorkOrder) -> Result<WorkOrderDetail, DashboardError> {
        self.attempted_codes.lock().unwrap().push(order.code.clone());
        if self
            .collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DashboardError::WorkOrderAlreadyExists);
        }
        let shop = self
            .shops
            .iter()
            .find(|s| s.id == order.shop_id)
            .cloned()
            .ok_or_else(|| DashboardError::validation("shopId", "unknown shop"))?;
        let now = Utc::now();
        let detail = WorkOrderDetail {
            id: order.id,
            code: order.code.clone(),
            status: order.status,
            damage_date: order.damage_date,
            created_at: now,
            updated_at: now,
            customer: order.customer.clone(),
            vehicle: order.vehicle.clone(),
            shop,
            insurance: order.insurance.clone(),
        };
        self.orders.lock().unwrap().push(detail.clone());
        Ok(detail)
    }
}

/// Seed a stored order for `shop`, bypassing the usecase.
pub fn seed_order(repo: &MockWorkOrderRepo, shop: &Shop, code: &str) {
    let now = Utc::now();
    repo.orders.lock().unwrap().push(WorkOrderDetail {
        id: Default::default(),
        code: code.to_owned(),
        status: Default::default(),
        damage_date: None,
        created_at: now,
        updated_at: now,
        customer: Customer {
            first_name: "Jane".into(),
            email: "jane.doe@example.com".into(),
            ..test_customer()
        },
        vehicle: test_vehicle(),
        shop: shop.summary(),
        insurance: Some(Insurance {
            insurance_company: Some("Prairie Mutual".into()),
            ..Default::default()
        }),
    });
}

// ── MockDirectory ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DirectoryLog {
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    pub disabled: Vec<String>,
    pub enabled: Vec<String>,
    pub verified: Vec<String>,
    pub links: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockDirectory {
    pub log: Arc<Mutex<DirectoryLog>>,
    pub fail_links: bool,
    pub fail_disable: bool,
    pub fail_delete: bool,
    pub fail_verify: bool,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_links() -> Self {
        Self {
            fail_links: true,
            ..Self::default()
        }
    }

    pub fn failing_disable() -> Self {
        Self {
            fail_disable: true,
            ..Self::default()
        }
    }

    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    pub fn failing_verify() -> Self {
        Self {
            fail_verify: true,
            ..Self::default()
        }
    }

    /// External accounts that exist right now.
    pub fn live_accounts(&self) -> Vec<String> {
        let log = self.log.lock().unwrap();
        log.created
            .iter()
            .filter(|uid| !log.deleted.contains(uid))
            .cloned()
            .collect()
    }
}

impl IdentityDirectory for MockDirectory {
    async fn create_passwordless_account(
        &self,
        _email: &str,
        _first_name: &str,
        _last_name: &str,
    ) -> Result<String, DashboardError> {
        let mut log = self.log.lock().unwrap();
        let uid = format!("ext-new-{}", log.created.len() + 1);
        log.created.push(uid.clone());
        Ok(uid)
    }

    async fn delete_account(&self, uid: &str) -> Result<(), DashboardError> {
        if self.fail_delete {
            return Err(anyhow::anyhow!("identity provider unavailable").into());
        }
        self.log.lock().unwrap().deleted.push(uid.to_owned());
        Ok(())
    }

    async fn disable_account(&self, uid: &str) -> Result<(), DashboardError> {
        if self.fail_disable {
            return Err(anyhow::anyhow!("identity provider unavailable").into());
        }
        self.log.lock().unwrap().disabled.push(uid.to_owned());
        Ok(())
    }

    async fn enable_account(&self, uid: &str) -> Result<(), DashboardError> {
        self.log.lock().unwrap().enabled.push(uid.to_owned());
        Ok(())
    }

    async fn generate_password_reset_link(&self, email: &str) -> Result<String, DashboardError> {
        if self.fail_links {
            return Err(anyhow::anyhow!("identity provider unavailable").into());
        }
        let link = format!("https://auth.test/reset?email={email}");
        self.log.lock().unwrap().links.push(link.clone());
        Ok(link)
    }

    async fn set_email_verified(&self, uid: &str, verified: bool) -> Result<(), DashboardError> {
        if self.fail_verify {
            return Err(anyhow::anyhow!("identity provider unavailable").into());
        }
        if verified {
            self.log.lock().unwrap().verified.push(uid.to_owned());
        }
        Ok(())
    }
}

// ── MockEmail ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub template: &'static str,
    pub to: String,
    pub link: String,
}

#[derive(Clone, Default)]
pub struct MockEmail {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
}

impl MockEmail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailSender for MockEmail {
    async fn send_welcome_setup(&self, to: &str, _first_name: &str, link: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            template: "welcome",
            to: to.to_owned(),
            link: link.to_owned(),
        });
        Ok(())
    }

    async fn send_setup_reminder(&self, to: &str, _first_name: &str, link: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            template: "reminder",
            to: to.to_owned(),
            link: link.to_owned(),
        });
        Ok(())
    }
}
