use crate::otp::{dispatch::phase_of, Error, Hooks, Phase};
use axum::{
    body::Bytes,
    extract::Extension,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ConsentRequired
            | Self::MissingRecipient(_)
            | Self::MalformedEvent(_)
            | Self::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            Self::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path= "/hooks",
    request_body = Value,
    responses (
        (status = 200, description = "Event with its response section filled in", body = Value),
        (status = 400, description = "Sign-up rejected or event malformed", body = ErrorBody),
        (status = 502, description = "Passcode could not be delivered", body = ErrorBody),
    ),
    tag= "hooks"
)]
// axum handler for the identity provider hooks
pub async fn hooks(
    Extension(hooks): Extension<Arc<Hooks>>,
    body: Bytes,
) -> Result<Response, Error> {
    let raw: Value =
        serde_json::from_slice(&body).map_err(|err| Error::InvalidEvent(err.to_string()))?;

    // Unhandled triggers get the exact bytes back.
    if phase_of(&raw) == Phase::Unknown {
        return Ok(([(CONTENT_TYPE, "application/json")], body).into_response());
    }

    let event = hooks.handle_value(raw).await?;

    Ok(Json(event).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn consent_required_is_bad_request() {
        let (status, body) = body_of(Error::ConsentRequired).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "You must accept the Terms of Service to sign up."
        );
    }

    #[tokio::test]
    async fn malformed_event_is_bad_request() {
        let (status, body) = body_of(Error::MalformedEvent("request.session")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "malformed event: missing request.session");
    }

    #[tokio::test]
    async fn delivery_failure_is_bad_gateway() {
        let (status, body) = body_of(Error::DeliveryFailed("timeout".to_string())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn invalid_event_is_bad_request() {
        let (status, body) = body_of(Error::InvalidEvent("expected value".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid event: expected value");
    }
}
