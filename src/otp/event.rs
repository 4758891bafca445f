//! Identity-provider hook event model.
//!
//! Only the fields the handlers read or write are typed. Everything else the
//! provider sends (`version`, `region`, `userPoolId`, `callerContext`, ...) lands in
//! the flattened `extra` maps and is serialized back unchanged.

use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Challenge name owned by this service.
pub const CUSTOM_CHALLENGE: &str = "CUSTOM_CHALLENGE";

/// Protocol step an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreSignUp,
    DefineAuthChallenge,
    CreateAuthChallenge,
    VerifyAuthChallengeResponse,
    Unknown,
}

impl Phase {
    /// Map a provider trigger source to a phase.
    ///
    /// Accepts the bare phase tag and the sign-up/authentication flow variants the
    /// provider emits. Any other source, including other pre-sign-up flows, is `Unknown`.
    #[must_use]
    pub fn from_trigger_source(source: &str) -> Self {
        match source {
            "PreSignUp" | "PreSignUp_SignUp" => Self::PreSignUp,
            "DefineAuthChallenge" | "DefineAuthChallenge_Authentication" => {
                Self::DefineAuthChallenge
            }
            "CreateAuthChallenge" | "CreateAuthChallenge_Authentication" => {
                Self::CreateAuthChallenge
            }
            "VerifyAuthChallengeResponse" | "VerifyAuthChallengeResponse_Authentication" => {
                Self::VerifyAuthChallengeResponse
            }
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreSignUp => "PreSignUp",
            Self::DefineAuthChallenge => "DefineAuthChallenge",
            Self::CreateAuthChallenge => "CreateAuthChallenge",
            Self::VerifyAuthChallengeResponse => "VerifyAuthChallengeResponse",
            Self::Unknown => "Unknown",
        }
    }
}

/// One historical challenge round, as recorded by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeAttempt {
    pub challenge_name: String,
    pub challenge_result: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChallengeAttempt {
    #[must_use]
    pub fn new(challenge_name: &str, challenge_result: bool) -> Self {
        Self {
            challenge_name: challenge_name.to_string(),
            challenge_result,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.challenge_name == CUSTOM_CHALLENGE
    }
}

/// Read-only input of an invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Vec<ChallengeAttempt>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_attributes: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_challenge_parameters: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output of an invocation; the only part of the event the handlers write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_tokens: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_authentication: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_challenge_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_challenge_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_confirm_user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_verify_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_correct: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single hook invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthEvent {
    #[must_use]
    pub fn new(trigger_source: &str, request: Request) -> Self {
        Self {
            trigger_source: Some(trigger_source.to_string()),
            request: Some(request),
            response: Some(Response::default()),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.trigger_source
            .as_deref()
            .map_or(Phase::Unknown, Phase::from_trigger_source)
    }

    /// # Errors
    /// Returns `MalformedEvent` if the provider sent no `request` object.
    pub fn request(&self) -> Result<&Request> {
        self.request.as_ref().ok_or(Error::MalformedEvent("request"))
    }

    /// Response section, created empty if the provider omitted it.
    pub fn response_mut(&mut self) -> &mut Response {
        self.response.get_or_insert_with(Response::default)
    }
}
