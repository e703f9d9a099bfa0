//! Email notifications and the `email_queue` entity.
//!
//! Every outgoing email is recorded as a queue row; delivery happens through
//! a configured HTTP mail API. With no mailer configured rows stay queued
//! with `is_sent = false`, which keeps tests and local setups silent.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde_json::json;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "email_queue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub is_sent: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Settings for the outbound mail API.
#[derive(Clone, Debug)]
pub struct MailerConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
}

/// Sends emails through an HTTP mail API and records every attempt in the
/// queue table.
pub struct Mailer {
    client: reqwest::Client,
    config: Option<MailerConfig>,
}

impl Mailer {
    #[must_use]
    pub fn new(config: Option<MailerConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Unconfigured mailer: everything lands in the queue unsent.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None)
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        let Some(config) = &self.config else {
            return false;
        };

        let payload = json!({
            "from": config.sender,
            "to": recipient,
            "subject": subject,
            "body": body,
        });

        match self
            .client
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "mail API rejected email");
                false
            }
            Err(err) => {
                tracing::warn!("failed to reach mail API: {err}");
                false
            }
        }
    }

    /// Attempts delivery and records the outcome. Never fails the caller:
    /// notification problems are logged, not surfaced.
    pub async fn deliver(
        &self,
        db: &DatabaseConnection,
        recipient: &str,
        subject: &str,
        body: &str,
    ) {
        let sent = self.send(recipient, subject, body).await;

        let row = ActiveModel {
            id: ActiveValue::NotSet,
            recipient_email: ActiveValue::Set(recipient.to_string()),
            subject: ActiveValue::Set(subject.to_string()),
            body: ActiveValue::Set(body.to_string()),
            sent_at: ActiveValue::Set(sent.then(Utc::now)),
            is_sent: ActiveValue::Set(sent),
        };
        if let Err(err) = row.insert(db).await {
            tracing::error!("failed to queue email: {err}");
        }
    }
}
