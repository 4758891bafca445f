use super::{
    error::{Error, Result},
    event::AuthEvent,
    issuer::PRIVATE_ANSWER,
};
use subtle::ConstantTimeEq;
use tracing::{info, instrument};

/// `true` iff a stored answer exists and equals the submitted one.
///
/// The byte comparison is constant-time for equal-length inputs, so response timing
/// does not reveal how many leading digits were right.
#[must_use]
pub fn answers_match(stored: Option<&str>, submitted: &str) -> bool {
    stored.is_some_and(|stored| bool::from(stored.as_bytes().ct_eq(submitted.as_bytes())))
}

/// Handle `VerifyAuthChallengeResponse`.
///
/// # Errors
/// Returns `MalformedEvent` if `request.privateChallengeParameters` or
/// `request.challengeAnswer` is missing. A missing `answer` key is just a wrong answer.
#[instrument(skip_all)]
pub fn verify_auth_challenge(event: &mut AuthEvent) -> Result<()> {
    let request = event.request()?;
    let stored = request
        .private_challenge_parameters
        .as_ref()
        .ok_or(Error::MalformedEvent("request.privateChallengeParameters"))?
        .get(PRIVATE_ANSWER)
        .map(String::as_str);
    let submitted = request
        .challenge_answer
        .as_deref()
        .ok_or(Error::MalformedEvent("request.challengeAnswer"))?;

    let correct = answers_match(stored, submitted);

    event.response_mut().answer_correct = Some(correct);

    info!(answer_correct = correct, "challenge answer verified");

    Ok(())
}
