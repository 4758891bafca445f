//! Passcode challenge protocol: one handler per provider phase.
//!
//! Every handler reads the request section of an `AuthEvent` and writes only its
//! response section. No handler calls another; the provider re-invokes the hook for
//! each step and carries the session history and private parameters in between.

pub mod arbiter;
pub mod code;
pub mod consent;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod issuer;
pub mod notify;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::error::{Error, Result};
pub use self::event::{AuthEvent, ChallengeAttempt, Phase, Request, Response, CUSTOM_CHALLENGE};

use self::notify::NotificationSender;
use crate::email::EmailSender;
use std::{fmt, str::FromStr, sync::Arc, time::Duration};
use url::Url;

const DEFAULT_FROM_EMAIL: &str = "noreply@bitcoinbrowserminer.com";
const DEFAULT_PRODUCT_NAME: &str = "Bitcoin Browser Miner";
const DEFAULT_CONSENT_ATTRIBUTE: &str = "custom:tos_accepted";
const DEFAULT_RECIPIENT_ATTRIBUTE: &str = "email";
const DEFAULT_CODE_TTL_MINUTES: u64 = 3;
const DEFAULT_DELIVERY_TIMEOUT_SECONDS: u64 = 10;

/// What to do with a challenge whose code could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Log the failure and keep the challenge issued.
    #[default]
    FailOpen,
    /// Fail the invocation so the provider aborts the challenge.
    FailClosed,
}

impl DeliveryMode {
    pub const VARIANTS: [&'static str; 2] = ["fail-open", "fail-closed"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FailOpen => "fail-open",
            Self::FailClosed => "fail-closed",
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "fail-open" => Ok(Self::FailOpen),
            "fail-closed" => Ok(Self::FailClosed),
            other => Err(format!("invalid delivery mode: {other}")),
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    from_email: String,
    product_name: String,
    image_url: Option<Url>,
    code_ttl_minutes: u64,
    code_length: u32,
    consent_attribute: String,
    recipient_attribute: String,
    mask_recipient: bool,
    max_attempts: u32,
    delivery_mode: DeliveryMode,
    delivery_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            image_url: None,
            code_ttl_minutes: DEFAULT_CODE_TTL_MINUTES,
            code_length: code::DEFAULT_CODE_LENGTH,
            consent_attribute: DEFAULT_CONSENT_ATTRIBUTE.to_string(),
            recipient_attribute: DEFAULT_RECIPIENT_ATTRIBUTE.to_string(),
            mask_recipient: false,
            max_attempts: 0,
            delivery_mode: DeliveryMode::FailOpen,
            delivery_timeout: Duration::from_secs(DEFAULT_DELIVERY_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_from_email(mut self, from_email: String) -> Self {
        self.from_email = from_email;
        self
    }

    #[must_use]
    pub fn with_product_name(mut self, product_name: String) -> Self {
        self.product_name = product_name;
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<Url>) -> Self {
        self.image_url = image_url;
        self
    }

    #[must_use]
    pub fn with_code_ttl_minutes(mut self, minutes: u64) -> Self {
        self.code_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_code_length(mut self, length: u32) -> Self {
        self.code_length = length.clamp(code::MIN_CODE_LENGTH, code::MAX_CODE_LENGTH);
        self
    }

    #[must_use]
    pub fn with_consent_attribute(mut self, attribute: String) -> Self {
        self.consent_attribute = attribute;
        self
    }

    #[must_use]
    pub fn with_recipient_attribute(mut self, attribute: String) -> Self {
        self.recipient_attribute = attribute;
        self
    }

    #[must_use]
    pub fn with_mask_recipient(mut self, mask: bool) -> Self {
        self.mask_recipient = mask;
        self
    }

    /// Failed custom attempts after which authentication fails. `0` disables the cap.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = mode;
        self
    }

    #[must_use]
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    #[must_use]
    pub fn from_email(&self) -> &str {
        &self.from_email
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    #[must_use]
    pub fn code_ttl_minutes(&self) -> u64 {
        self.code_ttl_minutes
    }

    #[must_use]
    pub fn code_length(&self) -> u32 {
        self.code_length
    }

    #[must_use]
    pub fn consent_attribute(&self) -> &str {
        &self.consent_attribute
    }

    #[must_use]
    pub fn recipient_attribute(&self) -> &str {
        &self.recipient_attribute
    }

    #[must_use]
    pub fn mask_recipient(&self) -> bool {
        self.mask_recipient
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }
}

/// Shared handler state: read-only configuration plus the delivery capability.
#[derive(Clone, Debug)]
pub struct Hooks {
    config: Arc<Config>,
    notifier: NotificationSender,
}

impl Hooks {
    #[must_use]
    pub fn new(config: Config, sender: Arc<dyn EmailSender>) -> Self {
        let notifier = NotificationSender::new(&config, sender);
        Self {
            config: Arc::new(config),
            notifier,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn notifier(&self) -> &NotificationSender {
        &self.notifier
    }

    /// Run the handler for the event's phase and return the updated event.
    ///
    /// # Errors
    /// Returns the selected handler's error; see `dispatch::dispatch`.
    pub async fn handle(&self, event: AuthEvent) -> Result<AuthEvent> {
        dispatch::dispatch(self, event).await
    }

    /// Like `handle`, for an event as received on the wire.
    ///
    /// Only the response fields a handler writes are changed; see
    /// `dispatch::dispatch_value`.
    ///
    /// # Errors
    /// Returns `InvalidEvent` or the selected handler's error.
    pub async fn handle_value(&self, raw: serde_json::Value) -> Result<serde_json::Value> {
        dispatch::dispatch_value(self, raw).await
    }
}
