//! Role vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of seeded roles.
///
/// Wire format: lowercase code string (`"superadmin"`, `"admin"`, `"adjuster"`, `"bodyman"`).
/// The same code is stored in `roles.code` and is what policy decisions match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleCode {
    SuperAdmin,
    Admin,
    Adjuster,
    Bodyman,
}

/// Privilege tier. Adjuster and bodyman are peers inside [`Tier::Staff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Staff,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role code: {0}")]
pub struct UnknownRoleCode(pub String);

impl RoleCode {
    pub const ALL: [RoleCode; 4] = [
        RoleCode::SuperAdmin,
        RoleCode::Admin,
        RoleCode::Adjuster,
        RoleCode::Bodyman,
    ];

    /// Stable code string.
    pub fn code(self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::Admin => "admin",
            Self::Adjuster => "adjuster",
            Self::Bodyman => "bodyman",
        }
    }

    /// Parse a code string. Matching is exact; callers normalize before parsing.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    /// Display name seeded alongside the code.
    pub fn name(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Administrator",
            Self::Admin => "Administrator",
            Self::Adjuster => "Adjuster",
            Self::Bodyman => "Bodyman",
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            Self::SuperAdmin => Tier::SuperAdmin,
            Self::Admin => Tier::Admin,
            Self::Adjuster | Self::Bodyman => Tier::Staff,
        }
    }

    pub fn is_staff(self) -> bool {
        self.tier() == Tier::Staff
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RoleCode {
    type Err = UnknownRoleCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownRoleCode(s.to_owned()))
    }
}
