use crate::{email::valid_email, otp::DeliveryMode};
use anyhow::{anyhow, Context, Result};
use clap::{
    builder::{PossibleValuesParser, ValueParser},
    Arg, Command,
};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub const ARG_FROM_EMAIL: &str = "from-email";
pub const ARG_PRODUCT_NAME: &str = "product-name";
pub const ARG_IMAGE_URL: &str = "image-url";
pub const ARG_CODE_TTL_MINUTES: &str = "code-ttl-minutes";
pub const ARG_DELIVERY_MODE: &str = "delivery-mode";
pub const ARG_DELIVERY_TIMEOUT_SECONDS: &str = "delivery-timeout-seconds";
pub const ARG_MAIL_API_URL: &str = "mail-api-url";
pub const ARG_MAIL_API_TOKEN: &str = "mail-api-token";

#[derive(Debug)]
pub struct Options {
    pub from_email: String,
    pub product_name: String,
    pub image_url: Option<Url>,
    pub code_ttl_minutes: u64,
    pub delivery_mode: DeliveryMode,
    pub delivery_timeout: Duration,
    pub mail_api_url: Option<Url>,
    pub mail_api_token: Option<SecretString>,
}

impl Options {
    /// # Errors
    /// Returns an error if a value is missing or does not parse.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let from_email = matches
            .get_one::<String>(ARG_FROM_EMAIL)
            .cloned()
            .context("missing required argument: --from-email")?;

        let product_name = matches
            .get_one::<String>(ARG_PRODUCT_NAME)
            .cloned()
            .context("missing required argument: --product-name")?;

        let delivery_mode = matches
            .get_one::<String>(ARG_DELIVERY_MODE)
            .map(|mode| mode.parse::<DeliveryMode>())
            .transpose()
            .map_err(|e| anyhow!(e))?
            .unwrap_or_default();

        let delivery_timeout = Duration::from_secs(
            matches
                .get_one::<u64>(ARG_DELIVERY_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        );

        Ok(Self {
            from_email,
            product_name,
            image_url: matches.get_one::<Url>(ARG_IMAGE_URL).cloned(),
            code_ttl_minutes: matches
                .get_one::<u64>(ARG_CODE_TTL_MINUTES)
                .copied()
                .unwrap_or(3),
            delivery_mode,
            delivery_timeout,
            mail_api_url: matches.get_one::<Url>(ARG_MAIL_API_URL).cloned(),
            mail_api_token: matches
                .get_one::<String>(ARG_MAIL_API_TOKEN)
                .map(|token| SecretString::from(token.clone())),
        })
    }
}

fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        if valid_email(email) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

fn validator_url() -> ValueParser {
    ValueParser::from(move |url: &str| -> std::result::Result<Url, String> {
        Url::parse(url).map_err(|e| format!("invalid URL: {e}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_message_args(command);
    with_transport_args(command)
}

fn with_message_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FROM_EMAIL)
                .long(ARG_FROM_EMAIL)
                .help("Sender address for passcode emails")
                .env("OTP_HOOKS_FROM_EMAIL")
                .default_value("noreply@bitcoinbrowserminer.com")
                .value_parser(validator_email()),
        )
        .arg(
            Arg::new(ARG_PRODUCT_NAME)
                .long(ARG_PRODUCT_NAME)
                .help("Product name used in the email subject and body")
                .env("OTP_HOOKS_PRODUCT_NAME")
                .default_value("Bitcoin Browser Miner"),
        )
        .arg(
            Arg::new(ARG_IMAGE_URL)
                .long(ARG_IMAGE_URL)
                .help("Logo shown at the top of the HTML email")
                .env("OTP_HOOKS_IMAGE_URL")
                .value_parser(validator_url()),
        )
        .arg(
            Arg::new(ARG_CODE_TTL_MINUTES)
                .long(ARG_CODE_TTL_MINUTES)
                .help("Validity stated in the email, in minutes")
                .env("OTP_HOOKS_CODE_TTL_MINUTES")
                .default_value("3")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

fn with_transport_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DELIVERY_MODE)
                .long(ARG_DELIVERY_MODE)
                .help("Whether a failed delivery keeps the challenge (fail-open) or aborts it (fail-closed)")
                .env("OTP_HOOKS_DELIVERY_MODE")
                .default_value("fail-open")
                .value_parser(PossibleValuesParser::new(DeliveryMode::VARIANTS)),
        )
        .arg(
            Arg::new(ARG_DELIVERY_TIMEOUT_SECONDS)
                .long(ARG_DELIVERY_TIMEOUT_SECONDS)
                .help("Upper bound on a single email delivery, in seconds")
                .env("OTP_HOOKS_DELIVERY_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_MAIL_API_URL)
                .long(ARG_MAIL_API_URL)
                .help("HTTP mail API endpoint; emails are only logged when unset")
                .env("OTP_HOOKS_MAIL_API_URL")
                .value_parser(validator_url()),
        )
        .arg(
            Arg::new(ARG_MAIL_API_TOKEN)
                .long(ARG_MAIL_API_TOKEN)
                .help("Bearer token for the mail API")
                .env("OTP_HOOKS_MAIL_API_TOKEN")
                .hide_env_values(true)
                .requires(ARG_MAIL_API_URL),
        )
}
