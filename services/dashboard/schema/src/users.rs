use sea_orm::entity::prelude::*;

/// Local directory record for a dashboard account.
///
/// `deactivated_at` and `deactivated_by` are both null or both set (check constraint).
/// `shop_id` is null only for superadmin-tier accounts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    #[sea_orm(unique)]
    pub external_id: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub token_version: i32,
    pub role_id: Uuid,
    pub shop_id: Option<Uuid>,
    pub deactivated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub deactivated_by: Option<Uuid>,
    pub last_sign_in_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::roles::Entity",
        from = "Column::RoleId",
        to = "super::roles::Column::Id"
    )]
    Role,
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ShopId",
        to = "super::shops::Column::Id"
    )]
    Shop,
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
