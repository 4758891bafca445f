//! # otp-hooks (Out-of-band passcode challenges)
//!
//! `otp-hooks` answers the custom-authentication hooks of an external identity
//! provider with a stateless one-time passcode flow. The provider calls the hook
//! endpoint once per protocol step and carries all state between steps itself.
//!
//! ## Protocol
//!
//! - **PreSignUp:** registration is only allowed when the user accepted the terms of
//!   service. Accepted accounts are confirmed immediately, since the passcode flow
//!   verifies the email address on every sign-in anyway.
//! - **DefineAuthChallenge:** decides from the session history whether to issue
//!   another `CUSTOM_CHALLENGE` or to issue tokens.
//! - **CreateAuthChallenge:** generates a numeric code, stores it in the private
//!   challenge parameters and emails it to the user.
//! - **VerifyAuthChallengeResponse:** compares the submitted code with the stored one
//!   in constant time.
//!
//! ## State
//!
//! Nothing is persisted here. Issued codes only live in the provider's private
//! challenge parameters, which are never forwarded to the client.

pub mod api;
pub mod cli;
pub mod email;
pub mod otp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
