//! Pre-sign-up consent gate.

use super::{
    error::{Error, Result},
    event::AuthEvent,
    Config,
};
use tracing::{info, instrument, warn};

/// Exact attribute value that counts as accepted terms of service.
pub const CONSENT_ACCEPTED: &str = "true";

/// Allow the registration only if the consent attribute is exactly `"true"`.
///
/// Accepted accounts are confirmed and their email marked verified right away,
/// because every sign-in proves control of the address with a passcode.
///
/// # Errors
/// Returns `ConsentRequired` for any other value, or when the attribute (or the whole
/// attribute map) is absent. The response is left untouched in that case.
#[instrument(skip_all)]
pub fn pre_sign_up(event: &mut AuthEvent, config: &Config) -> Result<()> {
    let accepted = event
        .request
        .as_ref()
        .and_then(|request| request.user_attributes.as_ref())
        .and_then(|attributes| attributes.get(config.consent_attribute()))
        .is_some_and(|value| value == CONSENT_ACCEPTED);

    if !accepted {
        warn!(
            attribute = config.consent_attribute(),
            "registration rejected: terms of service not accepted"
        );
        return Err(Error::ConsentRequired);
    }

    let response = event.response_mut();
    response.auto_confirm_user = Some(true);
    response.auto_verify_email = Some(true);

    info!("registration accepted; user auto-confirmed");

    Ok(())
}
