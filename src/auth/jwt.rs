/// Session Token Issuance and Validation
///
/// Signs identity claims with a single process-wide HMAC secret and checks
/// presented tokens against it. Tokens are stateless: nothing is stored
/// server-side and a token stops being accepted once its `exp` is reached.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::auth::clock::{Clock, SystemClock};
use crate::configuration::JwtSettings;
use crate::error::TokenError;

pub const DEFAULT_ISSUER: &str = "user-api";
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 24 * 60 * 60;

/// Algorithms accepted on validation. Anything outside the HMAC family is
/// rejected before the signature is looked at.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Token service reading wall-clock time
    pub fn new(secret: &str, issuer: impl Into<String>, lifetime_seconds: i64) -> Self {
        Self::with_clock(secret, issuer, lifetime_seconds, Arc::new(SystemClock))
    }

    pub fn with_clock(
        secret: &str,
        issuer: impl Into<String>,
        lifetime_seconds: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked against the injected clock in `validate`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            lifetime_seconds,
            clock,
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::new(
            &settings.secret,
            settings.issuer.clone(),
            settings.token_expiry_seconds,
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime_seconds
    }

    /// Issue a signed token for a subject
    ///
    /// # Errors
    /// Returns `TokenError::IssueFailed` if the claims cannot be signed
    pub fn issue(&self, subject_id: &str, subject_email: &str) -> Result<String, TokenError> {
        let claims = Claims::new(
            subject_id,
            subject_email,
            self.issuer.as_str(),
            self.clock.now(),
            self.lifetime_seconds,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::IssueFailed(e.to_string()))
    }

    /// Validate a presented token and return its claims
    ///
    /// # Errors
    /// - `TokenError::Malformed` if the token cannot be parsed
    /// - `TokenError::SignatureInvalid` if it was tampered with, signed with
    ///   another secret, or advertises a non-HMAC algorithm
    /// - `TokenError::Expired` if the current instant is at or past `exp`
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = classify(e.kind());
                tracing::debug!(reason = %e, "Token rejected");
                err
            })?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
