//! Numeric one-time codes.

use rand::{rngs::OsRng, Rng};
use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_CODE_LENGTH: u32 = 6;
pub const MIN_CODE_LENGTH: u32 = 4;
pub const MAX_CODE_LENGTH: u32 = 10;

/// A freshly generated code of exactly `length` decimal digits.
///
/// `Debug` output is redacted; the digits are only reachable through `expose`.
#[derive(Debug)]
pub struct Code(SecretString);

impl Code {
    /// Generate a code from the operating system CSPRNG.
    ///
    /// `length` is clamped to `MIN_CODE_LENGTH..=MAX_CODE_LENGTH`.
    #[must_use]
    pub fn generate(length: u32) -> Self {
        Self::generate_with_rng(&mut OsRng, length)
    }

    pub(crate) fn generate_with_rng<R: Rng>(rng: &mut R, length: u32) -> Self {
        let length = length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH);
        let value = rng.gen_range(0..10_u64.pow(length));
        let width = length as usize;
        Self(SecretString::from(format!("{value:0width$}")))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
