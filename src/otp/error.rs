use thiserror::Error;

/// Failures raised by the phase handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// The terms of service were not accepted; the provider must abort the registration.
    #[error("You must accept the Terms of Service to sign up.")]
    ConsentRequired,
    /// The user has no address to send the code to. Encoded as `NO_EMAIL` in the
    /// response instead of being returned to the provider.
    #[error("missing recipient attribute: {0}")]
    MissingRecipient(String),
    /// The code could not be handed to the email transport.
    #[error("failed to deliver challenge code: {0}")]
    DeliveryFailed(String),
    /// A structural field the selected phase needs is absent.
    #[error("malformed event: missing {0}")]
    MalformedEvent(&'static str),
    /// A handled phase carried a field of the wrong JSON type.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
