//! Static role → operation allow-list.
//!
//! This is the coarse gate applied at the transport boundary. It says whether a
//! class of action is available to a role at all; instance-level decisions about
//! a specific target live in the dashboard policy engine.

use std::fmt;

use havenz_domain::role::RoleCode;

/// Coarse-grained operation classes. Wire strings are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    UsersList,
    UsersGet,
    UsersCreate,
    UsersUpdate,
    UsersDeactivate,
    UsersReactivate,
    UsersResendSetupLink,
    UsersRevokeSessions,
    ShopsList,
    ShopsGet,
    ShopsCreate,
    ShopsUpdate,
    WorkOrdersList,
    WorkOrdersGetById,
    WorkOrdersCreate,
    MeGet,
    MeUpdate,
}

impl Operation {
    pub const ALL: [Operation; 17] = [
        Operation::UsersList,
        Operation::UsersGet,
        Operation::UsersCreate,
        Operation::UsersUpdate,
        Operation::UsersDeactivate,
        Operation::UsersReactivate,
        Operation::UsersResendSetupLink,
        Operation::UsersRevokeSessions,
        Operation::ShopsList,
        Operation::ShopsGet,
        Operation::ShopsCreate,
        Operation::ShopsUpdate,
        Operation::WorkOrdersList,
        Operation::WorkOrdersGetById,
        Operation::WorkOrdersCreate,
        Operation::MeGet,
        Operation::MeUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UsersList => "users:list",
            Self::UsersGet => "users:get",
            Self::UsersCreate => "users:create",
            Self::UsersUpdate => "users:update",
            Self::UsersDeactivate => "users:deactivate",
            Self::UsersReactivate => "users:reactivate",
            Self::UsersResendSetupLink => "users:resend_setup_link",
            Self::UsersRevokeSessions => "users:revoke_sessions",
            Self::ShopsList => "shops:list",
            Self::ShopsGet => "shops:get",
            Self::ShopsCreate => "shops:create",
            Self::ShopsUpdate => "shops:update",
            Self::WorkOrdersList => "workorders:list",
            Self::WorkOrdersGetById => "workorders:getByID",
            Self::WorkOrdersCreate => "workorders:create",
            Self::MeGet => "me:get",
            Self::MeUpdate => "me:update",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `role` may attempt `operation` at all.
pub fn can(role: RoleCode, operation: Operation) -> bool {
    use Operation::*;
    match role {
        RoleCode::SuperAdmin | RoleCode::Admin => true,
        RoleCode::Adjuster => matches!(
            operation,
            WorkOrdersList | WorkOrdersGetById | WorkOrdersCreate | MeGet | MeUpdate
        ),
        RoleCode::Bodyman => matches!(
            operation,
            WorkOrdersList | WorkOrdersGetById | MeGet | MeUpdate
        ),
    }
}

/// String form of [`can`]. Unknown role or unknown operation → `false`.
pub fn can_code(role: &str, operation: &str) -> bool {
    match (RoleCode::from_code(role), Operation::parse(operation)) {
        (Some(role), Some(operation)) => can(role, operation),
        _ => false,
    }
}
