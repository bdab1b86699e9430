//! Identity-provider adapters: id-token verification and account management over
//! the provider's REST admin API.

use std::time::Duration;

use anyhow::{Context as _, anyhow, bail};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use havenz_auth_types::error::AuthError;
use havenz_auth_types::token::{ExternalIdentity, IdTokenVerifier};

use crate::config::DashboardConfig;
use crate::domain::repository::{IdentityDirectory, TokenVerifier};
use crate::error::DashboardError;

// ── Token verifier ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct JwtTokenVerifier {
    inner: IdTokenVerifier,
}

impl JwtTokenVerifier {
    /// Build from config. An RSA public key wins over a shared secret.
    pub fn open(config: &DashboardConfig) -> anyhow::Result<Self> {
        let inner = match (&config.token_rsa_public_key_pem, &config.token_hs256_secret) {
            (Some(pem), _) => {
                IdTokenVerifier::rs256(pem.as_bytes(), &config.token_issuer, &config.token_audience)
                    .context("parse TOKEN_RSA_PUBLIC_KEY_PEM")?
            }
            (None, Some(secret)) => {
                IdTokenVerifier::hs256(secret, &config.token_issuer, &config.token_audience)
            }
            (None, None) => {
                bail!("one of TOKEN_RSA_PUBLIC_KEY_PEM or TOKEN_HS256_SECRET must be set")
            }
        };
        info!(issuer = %config.token_issuer, "token verifier opened");
        Ok(Self { inner })
    }

    pub fn from_verifier(inner: IdTokenVerifier) -> Self {
        Self { inner }
    }

    pub fn close(&self) {
        info!("token verifier closed");
    }
}

impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, AuthError> {
        self.inner.verify(token)
    }
}

// ── Identity directory ───────────────────────────────────────────────────────

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Admin client for the identity provider's account API.
#[derive(Clone)]
pub struct HttpIdentityDirectory {
    client: reqwest::Client,
    accounts_url: String,
    access_token: String,
    continue_url: Option<String>,
}

#[derive(Deserialize)]
struct CreateAccountResponse {
    #[serde(rename = "localId")]
    local_id: String,
}

#[derive(Deserialize)]
struct OobResponse {
    #[serde(rename = "oobLink")]
    oob_link: String,
}

impl HttpIdentityDirectory {
    pub fn open(config: &DashboardConfig) -> anyhow::Result<Self> {
        let base = config.identity_api_url.trim_end_matches('/');
        if base.is_empty() || config.identity_project_id.is_empty() {
            bail!("IDENTITY_API_URL and IDENTITY_PROJECT_ID must be set");
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build identity api client")?;
        info!(base_url = %base, project = %config.identity_project_id, "identity directory opened");
        Ok(Self {
            client,
            accounts_url: format!("{base}/v1/projects/{}/accounts", config.identity_project_id),
            access_token: config.identity_access_token.clone(),
            continue_url: config.password_setup_continue_url.clone(),
        })
    }

    pub fn close(&self) {
        info!("identity directory closed");
    }

    /// POST `body` to `accounts{suffix}`. Provider error codes come back in `error.message`.
    async fn call(&self, suffix: &str, body: Value) -> Result<Value, DashboardError> {
        let url = format!("{}{suffix}", self.accounts_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("identity api POST accounts{suffix}"))?;
        let status = resp.status();
        let payload: Value = resp
            .json()
            .await
            .with_context(|| format!("decode identity api accounts{suffix} response"))?;
        if status.is_success() {
            return Ok(payload);
        }
        let code = payload["error"]["message"].as_str().unwrap_or_default();
        if code.starts_with("EMAIL_EXISTS") || code.starts_with("DUPLICATE_LOCAL_ID") {
            return Err(DashboardError::UserAlreadyExists);
        }
        Err(anyhow!("identity api accounts{suffix} returned {status}: {code}").into())
    }
}

impl IdentityDirectory for HttpIdentityDirectory {
    async fn create_passwordless_account(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, DashboardError> {
        let payload = self
            .call(
                "",
                json!({
                    "email": email,
                    "displayName": format!("{first_name} {last_name}"),
                    "emailVerified": false,
                    "disabled": false,
                }),
            )
            .await?;
        let created: CreateAccountResponse =
            serde_json::from_value(payload).context("decode created account")?;
        Ok(created.local_id)
    }

    async fn delete_account(&self, uid: &str) -> Result<(), DashboardError> {
        self.call(":delete", json!({ "localId": uid })).await?;
        Ok(())
    }

    async fn disable_account(&self, uid: &str) -> Result<(), DashboardError> {
        self.call(":update", json!({ "localId": uid, "disableUser": true }))
            .await?;
        Ok(())
    }

    async fn enable_account(&self, uid: &str) -> Result<(), DashboardError> {
        self.call(":update", json!({ "localId": uid, "disableUser": false }))
            .await?;
        Ok(())
    }

    async fn generate_password_reset_link(&self, email: &str) -> Result<String, DashboardError> {
        let mut body = json!({
            "requestType": "PASSWORD_RESET",
            "email": email,
            "returnOobLink": true,
        });
        if let Some(ref url) = self.continue_url {
            body["continueUrl"] = Value::from(url.as_str());
        }
        let payload = self.call(":sendOobCode", body).await?;
        let oob: OobResponse = serde_json::from_value(payload).context("decode reset link")?;
        Ok(oob.oob_link)
    }

    async fn set_email_verified(&self, uid: &str, verified: bool) -> Result<(), DashboardError> {
        self.call(":update", json!({ "localId": uid, "emailVerified": verified }))
            .await?;
        Ok(())
    }
}
