//! Renders passcode emails and hands them to the configured `EmailSender`.

use super::{
    code::Code,
    error::{Error, Result},
    Config,
};
use crate::email::{EmailMessage, EmailSender};
use std::{fmt::Write as _, sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::{debug, instrument};
use url::Url;

#[derive(Clone)]
pub struct NotificationSender {
    sender: Arc<dyn EmailSender>,
    from_email: String,
    product_name: String,
    image_url: Option<Url>,
    delivery_timeout: Duration,
}

impl NotificationSender {
    #[must_use]
    pub fn new(config: &Config, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            sender,
            from_email: config.from_email().to_string(),
            product_name: config.product_name().to_string(),
            image_url: config.image_url().cloned(),
            delivery_timeout: config.delivery_timeout(),
        }
    }

    /// Render the subject, plain-text and HTML bodies for a code.
    #[must_use]
    pub fn compose(&self, recipient: &str, code: &Code, ttl_minutes: u64) -> EmailMessage {
        let product = &self.product_name;
        let validity = validity_statement(ttl_minutes);
        let ignore = "If you did not request this code, please ignore this email.";

        let text_body = format!(
            "{code} is your {product} code.\n\n{validity}\n{ignore}\n",
            code = code.expose()
        );

        let mut html_body = String::from(
            "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif; color: #222;\">\n",
        );
        if let Some(image_url) = &self.image_url {
            let _ = writeln!(
                html_body,
                "<img src=\"{}\" alt=\"{}\" width=\"120\" style=\"display: block; margin-bottom: 16px;\" />",
                escape_html(image_url.as_str()),
                escape_html(product)
            );
        }
        let _ = writeln!(
            html_body,
            "<p style=\"font-size: 18px;\"><strong style=\"font-size: 28px; letter-spacing: 4px;\">{}</strong> is your {} code.</p>",
            escape_html(code.expose()),
            escape_html(product)
        );
        let _ = writeln!(html_body, "<p>{}</p>", escape_html(&validity));
        let _ = writeln!(html_body, "<p style=\"color: #777;\">{ignore}</p>");
        html_body.push_str("</body>\n</html>\n");

        EmailMessage {
            from: self.from_email.clone(),
            to: recipient.to_string(),
            subject: format!("Your {product} Login Code"),
            text_body,
            html_body,
        }
    }

    /// Deliver a code, bounded by the configured delivery timeout.
    ///
    /// # Errors
    /// Returns `DeliveryFailed` if the transport rejects the message or does not
    /// answer in time.
    #[instrument(skip_all)]
    pub async fn send_code(&self, recipient: &str, code: &Code, ttl_minutes: u64) -> Result<()> {
        let message = self.compose(recipient, code, ttl_minutes);

        match timeout(self.delivery_timeout, self.sender.send(&message)).await {
            Ok(Ok(())) => {
                debug!("code handed to email transport");
                Ok(())
            }
            Ok(Err(err)) => Err(Error::DeliveryFailed(format!("{err:#}"))),
            Err(_) => Err(Error::DeliveryFailed(format!(
                "email transport did not answer within {:?}",
                self.delivery_timeout
            ))),
        }
    }
}

impl std::fmt::Debug for NotificationSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSender")
            .field("from_email", &self.from_email)
            .field("product_name", &self.product_name)
            .field("image_url", &self.image_url.as_ref().map(Url::as_str))
            .field("delivery_timeout", &self.delivery_timeout)
            .finish_non_exhaustive()
    }
}

fn validity_statement(ttl_minutes: u64) -> String {
    let unit = if ttl_minutes == 1 { "minute" } else { "minutes" };
    format!("This code is valid for {ttl_minutes} {unit}.")
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
