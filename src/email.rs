//! Email delivery abstractions.
//!
//! The passcode issuer hands a fully rendered `EmailMessage` to an `EmailSender`.
//! The sender decides how to deliver (mail API, SMTP relay, log) and returns
//! `Ok`/`Err`; whether an error aborts the challenge is decided by the caller.
//!
//! - `LogEmailSender` is the default for local development. It logs the masked
//!   recipient and the subject, never the body.
//! - `HttpEmailSender` posts the message as JSON to a mail API using a bearer token.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

// Bodies carry the passcode.
impl std::fmt::Debug for EmailMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailMessage")
            .field("from", &self.from)
            .field("to", &mask_email(&self.to))
            .field("subject", &self.subject)
            .field("text_body", &"***")
            .field("html_body", &"***")
            .finish()
    }
}

/// Email delivery capability injected into the passcode issuer.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error describing why it was not accepted.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the envelope instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %mask_email(&message.to),
            subject = %message.subject,
            "email send stub"
        );
        Ok(())
    }
}

/// Sender backed by an HTTP mail API.
///
/// The body is `{"from", "to": [..], "subject", "text", "html"}`; any non-2xx status
/// is treated as a failed delivery.
#[derive(Clone)]
pub struct HttpEmailSender {
    client: Client,
    url: Url,
    token: Option<SecretString>,
}

impl HttpEmailSender {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url, token: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("failed to build mail API client")?;

        Ok(Self { client, url, token })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Debug for HttpEmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailSender")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let payload = json!({
            "from": message.from,
            "to": [message.to],
            "subject": message.subject,
            "text": message.text_body,
            "html": message.html_body,
        });

        let mut request = self.client.post(self.url.clone()).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach mail API at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(ToString::to_string))
                .unwrap_or(body);
            return Err(anyhow!("{} - {}, {}", self.url, status, reason));
        }

        debug!(status = %status, "mail API accepted message");

        Ok(())
    }
}

/// Mask the local part of an address for logs and client-visible fields:
/// `alice@example.com` becomes `a***@example.com`.
#[must_use]
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// Loose address check for configured sender addresses.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}
