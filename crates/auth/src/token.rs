//! Session token verification (HS256 JWT).
//!
//! Verification never fails with an error: every outcome is a
//! [`TokenVerdict`], and callers match on it.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Why a presented token does not establish a session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("no signing secret configured")]
    MissingSecret,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token time window is inverted")]
    InvalidTimeWindow,
}

impl From<TokenValidationError> for InvalidReason {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => InvalidReason::Expired,
            TokenValidationError::NotYetValid => InvalidReason::NotYetValid,
            TokenValidationError::InvalidTimeWindow => InvalidReason::InvalidTimeWindow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(SessionClaims),
    Invalid(InvalidReason),
}

impl TokenVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenVerdict::Valid(_))
    }
}

/// Verifies session tokens against a clock supplied by the caller.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> TokenVerdict;
}

/// HS256 verifier keyed by a shared secret.
pub struct Hs256TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl Hs256TokenVerifier {
    /// An empty secret yields a verifier that rejects every token with
    /// [`InvalidReason::MissingSecret`].
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let key = (!secret.is_empty()).then(|| DecodingKey::from_secret(secret));

        // Time checks go through `validate_claims` so the clock is injectable.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self { key, validation }
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> TokenVerdict {
        let Some(key) = &self.key else {
            return TokenVerdict::Invalid(InvalidReason::MissingSecret);
        };

        let claims = match jsonwebtoken::decode::<SessionClaims>(token, key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature => InvalidReason::BadSignature,
                    ErrorKind::ExpiredSignature => InvalidReason::Expired,
                    ErrorKind::ImmatureSignature => InvalidReason::NotYetValid,
                    _ => InvalidReason::Malformed,
                };
                return TokenVerdict::Invalid(reason);
            }
        };

        match validate_claims(&claims, now) {
            Ok(()) => TokenVerdict::Valid(claims),
            Err(e) => TokenVerdict::Invalid(e.into()),
        }
    }
}

/// Mints HS256 session tokens.
///
/// Sign-in lives outside the gate; this is what it (and the tests) use to
/// produce tokens the verifier accepts.
pub struct Hs256TokenIssuer {
    key: EncodingKey,
}

impl Hs256TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key)
    }
}
