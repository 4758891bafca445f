use super::{
    arbiter, consent,
    error::{Error, Result},
    event::{AuthEvent, Response},
    issuer, verifier, Hooks, Phase,
};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

const TRIGGER_SOURCE: &str = "triggerSource";
const RESPONSE: &str = "response";

/// Phase of a raw event; anything without a string `triggerSource` is `Unknown`.
#[must_use]
pub fn phase_of(raw: &Value) -> Phase {
    raw.get(TRIGGER_SOURCE)
        .and_then(Value::as_str)
        .map_or(Phase::Unknown, Phase::from_trigger_source)
}

/// Route a raw event and write back only the response fields the handler changed.
///
/// Unknown phases are returned as received, whatever their shape. For handled phases
/// every input field, including explicit `null`s and fields the typed model does not
/// know about, is kept as it was.
///
/// # Errors
/// Returns `InvalidEvent` if a handled phase does not fit the event model, otherwise
/// whatever `dispatch` returns.
#[instrument(skip_all, fields(phase = phase_of(&raw).as_str()))]
pub async fn dispatch_value(hooks: &Hooks, mut raw: Value) -> Result<Value> {
    if phase_of(&raw) == Phase::Unknown {
        debug!("unhandled trigger source, returning raw event unchanged");
        return Ok(raw);
    }

    let event: AuthEvent = serde_json::from_value(raw.clone())
        .map_err(|err| Error::InvalidEvent(err.to_string()))?;

    let before = response_fields(event.response.as_ref());
    let handled = dispatch(hooks, event).await?;
    let changed: Map<String, Value> = response_fields(handled.response.as_ref())
        .into_iter()
        .filter(|(key, value)| before.get(key) != Some(value))
        .collect();

    if changed.is_empty() {
        return Ok(raw);
    }

    if let Some(root) = raw.as_object_mut() {
        let response = root
            .entry(RESPONSE)
            .or_insert_with(|| Value::Object(Map::new()));
        if !response.is_object() {
            *response = Value::Object(Map::new());
        }
        if let Some(response) = response.as_object_mut() {
            response.extend(changed);
        }
    }

    Ok(raw)
}

fn response_fields(response: Option<&Response>) -> Map<String, Value> {
    match response.map(serde_json::to_value) {
        Some(Ok(Value::Object(fields))) => fields,
        _ => Map::new(),
    }
}

/// Route an event to the handler for its phase.
///
/// Unknown phases come back untouched, so new provider triggers pointed at this hook
/// are harmless. No validation happens here; malformed events fail in the handler.
///
/// # Errors
/// Propagates the handler's error (`ConsentRequired`, `MalformedEvent`,
/// or `DeliveryFailed` in fail-closed mode).
#[instrument(skip_all, fields(phase = event.phase().as_str()))]
pub async fn dispatch(hooks: &Hooks, mut event: AuthEvent) -> Result<AuthEvent> {
    match event.phase() {
        Phase::PreSignUp => consent::pre_sign_up(&mut event, hooks.config())?,
        Phase::DefineAuthChallenge => arbiter::define_auth_challenge(&mut event, hooks.config())?,
        Phase::CreateAuthChallenge => {
            issuer::create_auth_challenge(&mut event, hooks.config(), hooks.notifier()).await?;
        }
        Phase::VerifyAuthChallengeResponse => verifier::verify_auth_challenge(&mut event)?,
        Phase::Unknown => {
            debug!(
                trigger_source = event.trigger_source.as_deref().unwrap_or("none"),
                "unhandled trigger source, returning event unchanged"
            );
        }
    }

    Ok(event)
}
