//! Lifecycle status enums for shops and work orders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Work order progress. Stored as its snake_case string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    WaitingForInspection,
    InProgress,
    Completed,
    FollowUpNeeded,
    AwaitingInfo,
}

impl WorkOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForInspection => "waiting_for_inspection",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::FollowUpNeeded => "follow_up_needed",
            Self::AwaitingInfo => "awaiting_info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting_for_inspection" => Some(Self::WaitingForInspection),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "follow_up_needed" => Some(Self::FollowUpNeeded),
            "awaiting_info" => Some(Self::AwaitingInfo),
            _ => None,
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shop operating status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopStatus {
    Active,
    Inactive,
}

impl ShopStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}
