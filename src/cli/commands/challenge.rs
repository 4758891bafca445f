use crate::otp::code::{DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};

pub const ARG_CODE_LENGTH: &str = "code-length";
pub const ARG_CONSENT_ATTRIBUTE: &str = "consent-attribute";
pub const ARG_RECIPIENT_ATTRIBUTE: &str = "recipient-attribute";
pub const ARG_MASK_RECIPIENT: &str = "mask-recipient";
pub const ARG_MAX_ATTEMPTS: &str = "max-attempts";

#[derive(Debug)]
pub struct Options {
    pub code_length: u32,
    pub consent_attribute: String,
    pub recipient_attribute: String,
    pub mask_recipient: bool,
    pub max_attempts: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if an argument with a default value is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            code_length: matches
                .get_one::<u32>(ARG_CODE_LENGTH)
                .copied()
                .unwrap_or(DEFAULT_CODE_LENGTH),
            consent_attribute: matches
                .get_one::<String>(ARG_CONSENT_ATTRIBUTE)
                .cloned()
                .context("missing required argument: --consent-attribute")?,
            recipient_attribute: matches
                .get_one::<String>(ARG_RECIPIENT_ATTRIBUTE)
                .cloned()
                .context("missing required argument: --recipient-attribute")?,
            mask_recipient: matches.get_flag(ARG_MASK_RECIPIENT),
            max_attempts: matches.get_one::<u32>(ARG_MAX_ATTEMPTS).copied().unwrap_or(0),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CODE_LENGTH)
                .long(ARG_CODE_LENGTH)
                .help("Number of digits in a passcode")
                .env("OTP_HOOKS_CODE_LENGTH")
                .default_value("6")
                .value_parser(clap::value_parser!(u32).range(
                    i64::from(MIN_CODE_LENGTH)..=i64::from(MAX_CODE_LENGTH),
                )),
        )
        .arg(
            Arg::new(ARG_CONSENT_ATTRIBUTE)
                .long(ARG_CONSENT_ATTRIBUTE)
                .help("User attribute that must be \"true\" for sign-up to proceed")
                .env("OTP_HOOKS_CONSENT_ATTRIBUTE")
                .default_value("custom:tos_accepted"),
        )
        .arg(
            Arg::new(ARG_RECIPIENT_ATTRIBUTE)
                .long(ARG_RECIPIENT_ATTRIBUTE)
                .help("User attribute holding the address the code is sent to")
                .env("OTP_HOOKS_RECIPIENT_ATTRIBUTE")
                .default_value("email"),
        )
        .arg(
            Arg::new(ARG_MASK_RECIPIENT)
                .long(ARG_MASK_RECIPIENT)
                .help("Mask the recipient address returned to the client")
                .env("OTP_HOOKS_MASK_RECIPIENT")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_MAX_ATTEMPTS)
                .long(ARG_MAX_ATTEMPTS)
                .help("Failed attempts after which authentication fails (0 = unlimited)")
                .env("OTP_HOOKS_MAX_ATTEMPTS")
                .default_value("0")
                .value_parser(clap::value_parser!(u32)),
        )
}
