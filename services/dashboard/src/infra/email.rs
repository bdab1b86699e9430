use anyhow::Context as _;
use serde_json::json;
use tracing::info;

use crate::config::DashboardConfig;
use crate::domain::repository::EmailSender;

pub struct Message {
    pub subject: String,
    pub body: String,
}

pub fn welcome_setup(first_name: &str, link: &str) -> Message {
    Message {
        subject: "Welcome to HavenzSure – Set your password".to_owned(),
        body: format!(
            "Hi {first_name},\n\n\
             An account has been created for you on the HavenzSure dashboard.\n\
             Set your password using the link below. The link is valid for 1 hour.\n\n\
             {link}\n\n\
             If you did not expect this email, you can ignore it.\n"
        ),
    }
}

pub fn setup_reminder(first_name: &str, link: &str) -> Message {
    Message {
        subject: "Reminder – Set your HavenzSure password".to_owned(),
        body: format!(
            "Hi {first_name},\n\n\
             Your HavenzSure account is still waiting for a password.\n\
             Use the link below to set it. The link is valid for 1 hour.\n\n\
             {link}\n"
        ),
    }
}

// ── Senders ──────────────────────────────────────────────────────────────────

/// Development sender: writes the message to the log instead of delivering it.
#[derive(Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    fn deliver(&self, to: &str, message: Message) {
        info!(to, subject = %message.subject, body = %message.body, "email (log only)");
    }
}

impl EmailSender for LogEmailSender {
    async fn send_welcome_setup(&self, to: &str, first_name: &str, link: &str) -> anyhow::Result<()> {
        self.deliver(to, welcome_setup(first_name, link));
        Ok(())
    }

    async fn send_setup_reminder(&self, to: &str, first_name: &str, link: &str) -> anyhow::Result<()> {
        self.deliver(to, setup_reminder(first_name, link));
        Ok(())
    }
}

/// Posts messages as JSON to an HTTP mail relay.
#[derive(Clone)]
pub struct RelayEmailSender {
    pub client: reqwest::Client,
    pub relay_url: String,
    pub from: String,
}

impl RelayEmailSender {
    async fn deliver(&self, to: &str, message: Message) -> anyhow::Result<()> {
        self.client
            .post(&self.relay_url)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": message.subject,
                "text": message.body,
            }))
            .send()
            .await
            .context("post to email relay")?
            .error_for_status()
            .context("email relay rejected message")?;
        info!(to, subject = %message.subject, "email relayed");
        Ok(())
    }
}

impl EmailSender for RelayEmailSender {
    async fn send_welcome_setup(&self, to: &str, first_name: &str, link: &str) -> anyhow::Result<()> {
        self.deliver(to, welcome_setup(first_name, link)).await
    }

    async fn send_setup_reminder(&self, to: &str, first_name: &str, link: &str) -> anyhow::Result<()> {
        self.deliver(to, setup_reminder(first_name, link)).await
    }
}

/// Sender picked at startup from config.
#[derive(Clone)]
pub enum AppEmailSender {
    Log(LogEmailSender),
    Relay(RelayEmailSender),
}

impl AppEmailSender {
    /// Relay when `EMAIL_RELAY_URL` is set, log-only otherwise.
    pub fn open(config: &DashboardConfig) -> Self {
        match &config.email_relay_url {
            Some(url) => {
                info!(relay_url = %url, "email relay enabled");
                Self::Relay(RelayEmailSender {
                    client: reqwest::Client::new(),
                    relay_url: url.clone(),
                    from: config.email_from.clone(),
                })
            }
            None => {
                info!("no email relay configured, emails are logged only");
                Self::Log(LogEmailSender)
            }
        }
    }
}

impl EmailSender for AppEmailSender {
    async fn send_welcome_setup(&self, to: &str, first_name: &str, link: &str) -> anyhow::Result<()> {
        match self {
            Self::Log(s) => s.send_welcome_setup(to, first_name, link).await,
            Self::Relay(s) => s.send_welcome_setup(to, first_name, link).await,
        }
    }

    async fn send_setup_reminder(&self, to: &str, first_name: &str, link: &str) -> anyhow::Result<()> {
        match self {
            Self::Log(s) => s.send_setup_reminder(to, first_name, link).await,
            Self::Relay(s) => s.send_setup_reminder(to, first_name, link).await,
        }
    }
}
