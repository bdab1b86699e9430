/// Why a request failed to authenticate.
///
/// Every variant collapses to the same unauthorized response at the transport
/// boundary. Use [`AuthError::reason`] for server-side logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    NoCredential,
    #[error("unauthorized")]
    InvalidCredential,
    #[error("unauthorized")]
    CredentialExpired,
    #[error("unauthorized")]
    CredentialRevoked,
    #[error("unauthorized")]
    UserNotFound,
    #[error("unauthorized")]
    UserInactive,
}

impl AuthError {
    pub fn reason(self) -> &'static str {
        match self {
            Self::NoCredential => "no_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::CredentialExpired => "credential_expired",
            Self::CredentialRevoked => "credential_revoked",
            Self::UserNotFound => "user_not_found",
            Self::UserInactive => "user_inactive",
        }
    }

    /// Account-state failures carry a valid credential and are worth auditing.
    pub fn is_account_state(self) -> bool {
        matches!(self, Self::UserNotFound | Self::UserInactive)
    }
}
