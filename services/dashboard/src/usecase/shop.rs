use chrono::Utc;
use tracing::info;

use havenz_auth_types::identity::Identity;
use havenz_auth_types::permission::Operation;
use havenz_domain::id::ShopId;
use havenz_domain::pagination::PageRequest;
use havenz_domain::status::ShopStatus;

use crate::domain::repository::ShopRepository;
use crate::domain::types::Shop;
use crate::domain::validate;
use crate::error::DashboardError;

fn require(actor: &Identity, operation: Operation) -> Result<(), DashboardError> {
    if actor.can(operation) {
        Ok(())
    } else {
        Err(DashboardError::Forbidden)
    }
}

/// Raw shop fields as submitted. Every field is normalized before validation.
#[derive(Debug, Clone, Default)]
pub struct ShopFields {
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

impl ShopFields {
    fn from_shop(shop: &Shop) -> Self {
        Self {
            code: shop.code.clone(),
            name: shop.name.clone(),
            status: Some(shop.status.as_str().to_owned()),
            address: shop.address.clone(),
            city: shop.city.clone(),
            province: shop.province.clone(),
            postal_code: shop.postal_code.clone(),
            contact_name: shop.contact_name.clone(),
            phone: shop.phone.clone(),
            email: shop.email.clone(),
        }
    }

    /// Normalize and validate into `shop`, leaving id and timestamps alone.
    fn apply(self, shop: &mut Shop) -> Result<(), DashboardError> {
        let code = validate::normalize_code(&self.code);
        if !(2..=10).contains(&code.chars().count()) {
            return Err(DashboardError::validation(
                "code",
                "must be between 2 and 10 characters",
            ));
        }
        let name = self.name.trim().to_owned();
        validate::require("name", &name)?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => ShopStatus::Active,
            Some(raw) => ShopStatus::parse(&raw.to_lowercase())
                .ok_or_else(|| DashboardError::validation("status", "must be active or inactive"))?,
        };
        let address = self.address.trim().to_owned();
        validate::require("address", &address)?;
        let city = self.city.trim().to_owned();
        validate::require("city", &city)?;
        let province = validate::normalize_code(&self.province);
        validate::province("province", &province)?;
        let postal_code = validate::normalize_postal_code(&self.postal_code);
        validate::postal_code("postalCode", &postal_code)?;
        let contact_name = self.contact_name.trim().to_owned();
        validate::require("contactName", &contact_name)?;
        let phone = self.phone.trim().to_owned();
        validate::phone("phone", &phone)?;
        let email = validate::normalize_email(&self.email);
        validate::email("email", &email)?;

        shop.code = code;
        shop.name = name;
        shop.status = status;
        shop.address = address;
        shop.city = city;
        shop.province = province;
        shop.postal_code = postal_code;
        shop.contact_name = contact_name;
        shop.phone = phone;
        shop.email = email;
        Ok(())
    }
}

// ── CreateShop ───────────────────────────────────────────────────────────────

pub struct CreateShopUseCase<S: ShopRepository> {
    pub shops: S,
}

impl<S: ShopRepository> CreateShopUseCase<S> {
    pub async fn execute(&self, actor: &Identity, input: ShopFields) -> Result<Shop, DashboardError> {
        require(actor, Operation::ShopsCreate)?;
        let now = Utc::now();
        let mut shop = Shop {
            id: ShopId::new(),
            code: String::new(),
            name: String::new(),
            status: ShopStatus::Active,
            address: String::new(),
            city: String::new(),
            province: String::new(),
            postal_code: String::new(),
            contact_name: String::new(),
            phone: String::new(),
            email: String::new(),
            created_at: now,
            updated_at: now,
        };
        input.apply(&mut shop)?;
        self.shops.create(&shop).await?;
        info!(shop_id = %shop.id, code = %shop.code, created_by = %actor.id, "shop created");
        Ok(shop)
    }
}

// ── GetShop ──────────────────────────────────────────────────────────────────

pub struct GetShopUseCase<S: ShopRepository> {
    pub shops: S,
}

impl<S: ShopRepository> GetShopUseCase<S> {
    pub async fn execute(&self, actor: &Identity, id: ShopId) -> Result<Shop, DashboardError> {
        require(actor, Operation::ShopsGet)?;
        self.shops
            .find_by_id(id)
            .await?
            .ok_or(DashboardError::ShopNotFound)
    }

    /// Look a shop up by its external code (case-insensitive).
    pub async fn by_code(&self, actor: &Identity, code: &str) -> Result<Shop, DashboardError> {
        require(actor, Operation::ShopsGet)?;
        self.shops
            .find_by_code(&validate::normalize_code(code))
            .await?
            .ok_or(DashboardError::ShopNotFound)
    }
}

// ── ListShops ────────────────────────────────────────────────────────────────

pub struct ListShopsUseCase<S: ShopRepository> {
    pub shops: S,
}

impl<S: ShopRepository> ListShopsUseCase<S> {
    pub async fn execute(
        &self,
        actor: &Identity,
        page: PageRequest,
    ) -> Result<Vec<Shop>, DashboardError> {
        require(actor, Operation::ShopsList)?;
        self.shops.list(page.clamped()).await
    }
}

// ── UpdateShop ───────────────────────────────────────────────────────────────

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateShopInput {
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

pub struct UpdateShopUseCase<S: ShopRepository> {
    pub shops: S,
}

impl<S: ShopRepository> UpdateShopUseCase<S> {
    pub async fn execute(
        &self,
        actor: &Identity,
        id: ShopId,
        input: UpdateShopInput,
    ) -> Result<Shop, DashboardError> {
        require(actor, Operation::ShopsUpdate)?;
        let mut shop = self
            .shops
            .find_by_id(id)
            .await?
            .ok_or(DashboardError::ShopNotFound)?;

        let current = ShopFields::from_shop(&shop);
        let merged = ShopFields {
            code: input.code.unwrap_or(current.code),
            name: input.name.unwrap_or(current.name),
            status: input.status.or(current.status),
            address: input.address.unwrap_or(current.address),
            city: input.city.unwrap_or(current.city),
            province: input.province.unwrap_or(current.province),
            postal_code: input.postal_code.unwrap_or(current.postal_code),
            contact_name: input.contact_name.unwrap_or(current.contact_name),
            phone: input.phone.unwrap_or(current.phone),
            email: input.email.unwrap_or(current.email),
        };
        merged.apply(&mut shop)?;
        shop.updated_at = Utc::now();
        self.shops.update(&shop).await?;
        Ok(shop)
    }
}
