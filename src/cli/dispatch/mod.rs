//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an action; for now that is always starting the
//! hook server with its full handler configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{challenge, delivery, ARG_PORT};
use crate::otp::Config;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let challenge_opts = challenge::Options::parse(matches)?;
    let delivery_opts = delivery::Options::parse(matches)?;

    let config = Config::default()
        .with_from_email(delivery_opts.from_email)
        .with_product_name(delivery_opts.product_name)
        .with_image_url(delivery_opts.image_url)
        .with_code_ttl_minutes(delivery_opts.code_ttl_minutes)
        .with_delivery_mode(delivery_opts.delivery_mode)
        .with_delivery_timeout(delivery_opts.delivery_timeout)
        .with_code_length(challenge_opts.code_length)
        .with_consent_attribute(challenge_opts.consent_attribute)
        .with_recipient_attribute(challenge_opts.recipient_attribute)
        .with_mask_recipient(challenge_opts.mask_recipient)
        .with_max_attempts(challenge_opts.max_attempts);

    Ok(Action::Server(Args {
        port,
        config,
        mail_api_url: delivery_opts.mail_api_url,
        mail_api_token: delivery_opts.mail_api_token,
    }))
}
