//! Challenge decision: another passcode round, tokens, or (with a cap) failure.

use super::{
    error::{Error, Result},
    event::{AuthEvent, ChallengeAttempt, CUSTOM_CHALLENGE},
    Config,
};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Ask for (another) `CUSTOM_CHALLENGE` round.
    Challenge,
    /// The last custom round succeeded; authentication is complete.
    IssueTokens,
    /// The configured attempt cap was reached.
    Fail,
}

/// Decide the next step from the session history (oldest first).
///
/// `max_attempts == 0` never fails the flow, so a wrong answer always earns a new
/// challenge. A positive value fails once that many custom rounds were answered wrong.
#[must_use]
pub fn decide(session: &[ChallengeAttempt], max_attempts: u32) -> Decision {
    let Some(last) = session.last() else {
        return Decision::Challenge;
    };

    if last.is_custom() && last.challenge_result {
        return Decision::IssueTokens;
    }

    if max_attempts > 0 {
        let failed = session
            .iter()
            .filter(|attempt| attempt.is_custom() && !attempt.challenge_result)
            .count();
        if failed >= max_attempts as usize {
            return Decision::Fail;
        }
    }

    Decision::Challenge
}

/// Handle `DefineAuthChallenge`.
///
/// # Errors
/// Returns `MalformedEvent` if the request or its `session` is missing.
#[instrument(skip_all)]
pub fn define_auth_challenge(event: &mut AuthEvent, config: &Config) -> Result<()> {
    let session = event
        .request()?
        .session
        .as_deref()
        .ok_or(Error::MalformedEvent("request.session"))?;

    let rounds = session.len();
    let decision = decide(session, config.max_attempts());

    let response = event.response_mut();
    match decision {
        Decision::Challenge => {
            response.challenge_name = Some(CUSTOM_CHALLENGE.to_string());
            response.issue_tokens = Some(false);
            response.fail_authentication = Some(false);
        }
        Decision::IssueTokens => {
            response.issue_tokens = Some(true);
            response.fail_authentication = Some(false);
        }
        Decision::Fail => {
            response.issue_tokens = Some(false);
            response.fail_authentication = Some(true);
        }
    }

    info!(rounds, decision = ?decision, "challenge decided");

    Ok(())
}
