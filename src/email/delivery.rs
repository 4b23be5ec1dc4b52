use super::digest::DigestComposer;
use crate::config::MailConfig;
use crate::models::article::Article;
use crate::models::user::User;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

pub const PROVIDER: &str = "mailgun";

/// Why a message was not sent. Returned as a value so callers can tell an
/// unsent email apart from a malformed request.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("No articles to send")]
    NoArticles,
    #[error("Failed to send email: {status} {reason}")]
    Rejected { status: u16, reason: String },
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    id: String,
    #[serde(default)]
    message: String,
}

/// Sends mail through the provider's HTTP API. Built once at startup.
#[derive(Clone)]
pub struct EmailService {
    http: Client,
    api_url: String,
    api_key: String,
    domain: String,
    from_email: String,
    base_url: String,
}

impl EmailService {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            domain: config.domain.clone(),
            from_email: config.from_email.clone(),
            base_url: config.app_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn provider(&self) -> &'static str {
        PROVIDER
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Sends one message and returns the provider's message id.
    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<String, DeliveryError> {
        let url = format!("{}/{}/messages", self.api_url, self.domain);
        let form = [
            ("from", self.from_email.as_str()),
            ("to", to),
            ("subject", subject),
            ("html", html),
            ("text", text),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Email sending error");
                DeliveryError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Mail provider API error");
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let result: ProviderResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Unreadable mail provider response");
            DeliveryError::Transport(e.to_string())
        })?;

        info!(
            to = to,
            message_id = %result.id,
            provider_message = %result.message,
            "Email accepted by provider"
        );
        Ok(result.id)
    }

    pub async fn send_digest_email(
        &self,
        user: &User,
        articles: &[Article],
    ) -> Result<String, DeliveryError> {
        if articles.is_empty() {
            debug!(user = %user.id, "No articles to send in digest");
            return Err(DeliveryError::NoArticles);
        }

        let email = DigestComposer::new(&self.base_url).compose(user, articles, false);
        self.send_email(&user.metadata.email, &email.subject, &email.html, &email.text)
            .await
    }

    /// Like a digest, but addressed to `recipient`, marked as a test, and
    /// rendered for a placeholder profile when no user is given.
    pub async fn send_test_digest_email(
        &self,
        recipient: &str,
        articles: &[Article],
        user: Option<&User>,
    ) -> Result<String, DeliveryError> {
        if articles.is_empty() {
            return Err(DeliveryError::NoArticles);
        }

        let placeholder;
        let profile = match user {
            Some(user) => user,
            None => {
                placeholder = User::placeholder(recipient, articles.len() as u32);
                &placeholder
            }
        };

        let email = DigestComposer::new(&self.base_url).compose(profile, articles, true);
        self.send_email(recipient, &email.subject, &email.html, &email.text)
            .await
    }
}
