//! Challenge creation: generate a code, split public/private parameters, deliver.

use super::{
    code::Code,
    error::{Error, Result},
    event::{AuthEvent, CUSTOM_CHALLENGE},
    notify::NotificationSender,
    Config, DeliveryMode,
};
use crate::email::mask_email;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, warn};

/// Marker surfaced to the client when the user has no address on file.
pub const NO_EMAIL: &str = "NO_EMAIL";
/// Metadata recorded on the session entry when a code was generated.
pub const CODE_SENT: &str = "CODE_SENT";

pub const PUBLIC_RECIPIENT: &str = "recipient";
pub const PUBLIC_ERROR: &str = "error";
pub const PRIVATE_ANSWER: &str = "answer";

/// Look up the delivery address; blank values count as absent.
///
/// # Errors
/// Returns `MissingRecipient` naming the attribute that was looked up.
pub fn recipient<'a>(attributes: &'a HashMap<String, String>, attribute: &str) -> Result<&'a str> {
    attributes
        .get(attribute)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::MissingRecipient(attribute.to_string()))
}

/// Handle `CreateAuthChallenge`.
///
/// Only `CUSTOM_CHALLENGE` rounds are handled; other challenge names are left to
/// whatever else the provider has configured. The code is written to the private
/// parameters only.
///
/// # Errors
/// Returns `MalformedEvent` if `request.challengeName` or `request.userAttributes` is
/// missing, and `DeliveryFailed` when delivery fails under `DeliveryMode::FailClosed`.
#[instrument(skip_all)]
pub async fn create_auth_challenge(
    event: &mut AuthEvent,
    config: &Config,
    notifier: &NotificationSender,
) -> Result<()> {
    let request = event.request()?;
    let challenge_name = request
        .challenge_name
        .as_deref()
        .ok_or(Error::MalformedEvent("request.challengeName"))?;

    if challenge_name != CUSTOM_CHALLENGE {
        debug!(challenge_name, "not a custom challenge, skipping");
        return Ok(());
    }

    let attributes = request
        .user_attributes
        .as_ref()
        .ok_or(Error::MalformedEvent("request.userAttributes"))?;

    let recipient = match recipient(attributes, config.recipient_attribute()) {
        Ok(recipient) => recipient.to_string(),
        Err(err) => {
            warn!("{err}; no code issued");
            let response = event.response_mut();
            response.public_challenge_parameters =
                Some(HashMap::from([(PUBLIC_ERROR.to_string(), NO_EMAIL.to_string())]));
            response.private_challenge_parameters = Some(HashMap::new());
            response.challenge_metadata = Some(NO_EMAIL.to_string());
            return Ok(());
        }
    };

    let code = Code::generate(config.code_length());

    let public_recipient = if config.mask_recipient() {
        mask_email(&recipient)
    } else {
        recipient.clone()
    };

    let response = event.response_mut();
    response.public_challenge_parameters = Some(HashMap::from([(
        PUBLIC_RECIPIENT.to_string(),
        public_recipient,
    )]));
    response.private_challenge_parameters = Some(HashMap::from([(
        PRIVATE_ANSWER.to_string(),
        code.expose().to_string(),
    )]));
    response.challenge_metadata = Some(CODE_SENT.to_string());

    let masked = mask_email(&recipient);
    match notifier
        .send_code(&recipient, &code, config.code_ttl_minutes())
        .await
    {
        Ok(()) => info!(recipient = %masked, "challenge code sent"),
        Err(err) => match config.delivery_mode() {
            DeliveryMode::FailOpen => {
                error!(recipient = %masked, "{err}; challenge remains issued");
            }
            DeliveryMode::FailClosed => {
                error!(recipient = %masked, "{err}; failing challenge");
                return Err(err);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::otp::{
        event::Request,
        test_support::{FailingEmailSender, RecordingEmailSender},
    };
    use crate::email::EmailSender;
    use std::sync::Arc;

    fn event_with(challenge_name: Option<&str>, email: Option<&str>) -> AuthEvent {
        let mut attributes = HashMap::new();
        if let Some(email) = email {
            attributes.insert("email".to_string(), email.to_string());
        }
        AuthEvent::new(
            "CreateAuthChallenge_Authentication",
            Request {
                challenge_name: challenge_name.map(ToString::to_string),
                user_attributes: Some(attributes),
                ..Request::default()
            },
        )
    }

    fn notifier(config: &Config, sender: Arc<dyn EmailSender>) -> NotificationSender {
        NotificationSender::new(config, sender)
    }

    #[tokio::test]
    async fn custom_challenge_issues_and_delivers_code() {
        let config = Config::default();
        let recorder = Arc::new(RecordingEmailSender::default());
        let mut event = event_with(Some(CUSTOM_CHALLENGE), Some("test@example.com"));

        create_auth_challenge(&mut event, &config, &notifier(&config, recorder.clone()))
            .await
            .unwrap();

        let response = event.response.unwrap();
        let public = response.public_challenge_parameters.unwrap();
        let private = response.private_challenge_parameters.unwrap();
        let answer = private.get(PRIVATE_ANSWER).unwrap();

        assert_eq!(answer.len(), 6);
        assert!(answer.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(public.get(PUBLIC_RECIPIENT).map(String::as_str), Some("test@example.com"));
        assert!(public.values().all(|value| !value.contains(answer.as_str())));
        assert_eq!(response.challenge_metadata.as_deref(), Some(CODE_SENT));

        let sent = recorder.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "test@example.com");
        assert!(sent[0]
            .text_body
            .contains(&format!("{answer} is your Bitcoin Browser Miner code.")));
        assert!(sent[0].subject.contains("Your Bitcoin Browser Miner Login Code"));
        assert!(sent[0].html_body.contains(answer.as_str()));
    }

    #[tokio::test]
    async fn each_invocation_generates_a_fresh_code() {
        let config = Config::default().with_code_length(10);
        let recorder = Arc::new(RecordingEmailSender::default());
        let notifier = notifier(&config, recorder);

        let mut answers = Vec::new();
        for _ in 0..2 {
            let mut event = event_with(Some(CUSTOM_CHALLENGE), Some("test@example.com"));
            create_auth_challenge(&mut event, &config, &notifier)
                .await
                .unwrap();
            let private = event.response.unwrap().private_challenge_parameters.unwrap();
            answers.push(private[PRIVATE_ANSWER].clone());
        }

        assert_eq!(answers[0].len(), 10);
        assert_ne!(answers[0], answers[1]);
    }

    #[tokio::test]
    async fn other_challenge_is_a_no_op() {
        let config = Config::default();
        let recorder = Arc::new(RecordingEmailSender::default());
        let mut event = event_with(Some("SMS_MFA"), Some("test@example.com"));
        let before = event.clone();

        create_auth_challenge(&mut event, &config, &notifier(&config, recorder.clone()))
            .await
            .unwrap();

        assert_eq!(event, before);
        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_email_returns_no_email_marker() {
        let config = Config::default();
        let recorder = Arc::new(RecordingEmailSender::default());

        for email in [None, Some("   ")] {
            let mut event = event_with(Some(CUSTOM_CHALLENGE), email);

            create_auth_challenge(&mut event, &config, &notifier(&config, recorder.clone()))
                .await
                .unwrap();

            let response = event.response.unwrap();
            assert_eq!(
                response.public_challenge_parameters,
                Some(HashMap::from([(
                    PUBLIC_ERROR.to_string(),
                    NO_EMAIL.to_string()
                )]))
            );
            assert_eq!(response.private_challenge_parameters, Some(HashMap::new()));
            assert_eq!(response.challenge_metadata.as_deref(), Some(NO_EMAIL));
        }

        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_fails_open_by_default() {
        let config = Config::default();
        let mut event = event_with(Some(CUSTOM_CHALLENGE), Some("test@example.com"));

        create_auth_challenge(
            &mut event,
            &config,
            &notifier(&config, Arc::new(FailingEmailSender)),
        )
        .await
        .unwrap();

        let private = event.response.unwrap().private_challenge_parameters.unwrap();
        assert_eq!(private[PRIVATE_ANSWER].len(), 6);
    }

    #[tokio::test]
    async fn delivery_failure_fails_closed_when_configured() {
        let config = Config::default().with_delivery_mode(DeliveryMode::FailClosed);
        let mut event = event_with(Some(CUSTOM_CHALLENGE), Some("test@example.com"));

        let err = create_auth_challenge(
            &mut event,
            &config,
            &notifier(&config, Arc::new(FailingEmailSender)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::DeliveryFailed(_)));
        assert!(err.to_string().contains("mail API unavailable"));
    }

    #[tokio::test]
    async fn masked_recipient_in_public_parameters() {
        let config = Config::default().with_mask_recipient(true);
        let recorder = Arc::new(RecordingEmailSender::default());
        let mut event = event_with(Some(CUSTOM_CHALLENGE), Some("test@example.com"));

        create_auth_challenge(&mut event, &config, &notifier(&config, recorder.clone()))
            .await
            .unwrap();

        let public = event.response.unwrap().public_challenge_parameters.unwrap();
        assert_eq!(public[PUBLIC_RECIPIENT], "t***@example.com");
        assert_eq!(recorder.messages()[0].to, "test@example.com");
    }

    #[tokio::test]
    async fn missing_structure_is_malformed() {
        let config = Config::default();
        let notifier = notifier(&config, Arc::new(RecordingEmailSender::default()));

        let mut event = event_with(None, Some("test@example.com"));
        assert!(matches!(
            create_auth_challenge(&mut event, &config, &notifier).await,
            Err(Error::MalformedEvent("request.challengeName"))
        ));

        let mut event = AuthEvent::new(
            "CreateAuthChallenge_Authentication",
            Request {
                challenge_name: Some(CUSTOM_CHALLENGE.to_string()),
                ..Request::default()
            },
        );
        assert!(matches!(
            create_auth_challenge(&mut event, &config, &notifier).await,
            Err(Error::MalformedEvent("request.userAttributes"))
        ));
    }

    #[test]
    fn recipient_lookup() {
        let attributes = HashMap::from([("email".to_string(), " a@example.com ".to_string())]);
        assert_eq!(recipient(&attributes, "email").unwrap(), "a@example.com");
        assert!(matches!(
            recipient(&attributes, "phone_number"),
            Err(Error::MissingRecipient(attr)) if attr == "phone_number"
        ));
    }
}
