use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use havenz_auth_types::error::AuthError;

/// Dashboard service error variants.
///
/// Field-scoped variants carry the offending input field so clients can self-correct.
/// Infrastructure failures are wrapped in `Internal` and never shown to callers.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{message}")]
    PermissionDenied {
        field: &'static str,
        message: String,
    },
    #[error("no shop assignment")]
    NoShopAssignment,
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("user not found")]
    UserNotFound,
    #[error("shop not found")]
    ShopNotFound,
    #[error("work order not found")]
    WorkOrderNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("shop already exists")]
    ShopAlreadyExists,
    #[error("work order already exists")]
    WorkOrderAlreadyExists,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn permission_denied(field: &'static str, message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::NoShopAssignment => "NO_SHOP_ASSIGNMENT",
            Self::Validation { .. } => "VALIDATION",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ShopNotFound => "SHOP_NOT_FOUND",
            Self::WorkOrderNotFound => "WORK_ORDER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::ShopAlreadyExists => "SHOP_ALREADY_EXISTS",
            Self::WorkOrderAlreadyExists => "WORK_ORDER_ALREADY_EXISTS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::PermissionDenied { field, .. } | Self::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

// Reasons are logged where the failure happens; callers only ever see 401.
impl From<AuthError> for DashboardError {
    fn from(_: AuthError) -> Self {
        Self::Unauthorized
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::PermissionDenied { .. } | Self::NoShopAssignment => {
                StatusCode::FORBIDDEN
            }
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::ShopNotFound | Self::WorkOrderNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UserAlreadyExists | Self::ShopAlreadyExists | Self::WorkOrderAlreadyExists => {
                StatusCode::CONFLICT
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(field) = self.field() {
            body["field"] = serde_json::Value::from(field);
        }
        (status, axum::Json(body)).into_response()
    }
}
