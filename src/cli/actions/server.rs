use crate::{
    api,
    cli::telemetry,
    email::{EmailSender, HttpEmailSender, LogEmailSender},
    otp::{Config, Hooks},
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub config: Config,
    pub mail_api_url: Option<Url>,
    pub mail_api_token: Option<SecretString>,
}

/// Pick the email transport: the HTTP mail API when configured, otherwise log only.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn email_sender(
    mail_api_url: Option<Url>,
    mail_api_token: Option<SecretString>,
) -> Result<Arc<dyn EmailSender>> {
    match mail_api_url {
        Some(url) => Ok(Arc::new(HttpEmailSender::new(url, mail_api_token)?)),
        None => {
            warn!("no mail API configured, passcode emails will only be logged");
            Ok(Arc::new(LogEmailSender))
        }
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the email transport cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let sender = email_sender(args.mail_api_url, args.mail_api_token)?;

    info!(
        from_email = args.config.from_email(),
        product_name = args.config.product_name(),
        code_length = args.config.code_length(),
        code_ttl_minutes = args.config.code_ttl_minutes(),
        max_attempts = args.config.max_attempts(),
        delivery_mode = %args.config.delivery_mode(),
        "starting otp hooks"
    );

    let hooks = Arc::new(Hooks::new(args.config, sender));

    let result = api::new(args.port, hooks).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_log_sender() {
        assert!(email_sender(None, None).is_ok());
    }

    #[test]
    fn builds_http_sender() {
        let url = Url::parse("https://mail.example.com/send").ok();
        assert!(email_sender(url, Some(SecretString::from("token".to_string()))).is_ok());
    }
}
