use std::time::Duration;

use serde::Deserialize;

use havenz_core::config::Config;

/// Dashboard service configuration loaded from environment variables.
///
/// Every field maps to its upper-cased name, e.g. `database_url` ← `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HTTP listen port (default 8080).
    #[serde(default = "default_port")]
    pub dashboard_port: u16,
    /// Per-request deadline in seconds (default 5).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Comma-separated list of allowed CORS origins.
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: String,

    pub token_issuer: String,
    pub token_audience: String,
    #[serde(default)]
    pub token_hs256_secret: Option<String>,
    #[serde(default)]
    pub token_rsa_public_key_pem: Option<String>,

    /// Base URL of the identity provider's account API.
    pub identity_api_url: String,
    pub identity_project_id: String,
    #[serde(default)]
    pub identity_access_token: String,
    /// Where the password setup page sends users once they are done.
    #[serde(default)]
    pub password_setup_continue_url: Option<String>,

    /// HTTP mail relay. Unset means mail is only logged.
    #[serde(default)]
    pub email_relay_url: Option<String>,
    #[serde(default = "default_email_from")]
    pub email_from: String,

    /// How long shutdown waits for background tasks (default 10).
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    5
}

fn default_cors_origins() -> String {
    "http://localhost:3000".to_owned()
}

fn default_email_from() -> String {
    "no-reply@havenzsure.ca".to_owned()
}

fn default_shutdown_grace() -> u64 {
    10
}

impl Config for DashboardConfig {}

impl DashboardConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
