//! Identity gate: bearer token verification.
//!
//! Tokens are HS256 JWTs carrying the caller's user id. Signature checks are
//! delegated to `jsonwebtoken`; expiry is checked against an injected
//! [`Clock`] so the gate stays deterministic under test.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::Error;
use crate::clock::{Clock, SystemClock};
use crate::note::UserId;

/// Token claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// Verifies bearer credentials and yields the embedded user id.
#[derive(Clone)]
pub struct IdentityGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: i64,
    leeway_secs: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl IdentityGate {
    pub fn new(secret: &[u8], token_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_secs,
            leeway_secs: 0,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Verify a raw token and return its user id.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if no token (or an empty one) is supplied
    /// - `InvalidCredential` if the signature does not verify or the token has expired
    pub fn authenticate(&self, raw_token: Option<&str>) -> Result<UserId, Error> {
        let token = raw_token.map(str::trim).filter(|t| !t.is_empty()).ok_or(Error::MissingCredential)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                Error::InvalidCredential("token signature is invalid".into())
            }
            _ => Error::InvalidCredential(format!("token validation failed: {e}")),
        })?;

        let now = self.clock.now().timestamp();
        if data.claims.exp < now - self.leeway_secs {
            tracing::debug!(user_id = data.claims.user_id, exp = data.claims.exp, now, "rejected expired token");
            return Err(Error::InvalidCredential("token has expired".into()));
        }

        Ok(data.claims.user_id)
    }

    /// Verify an `Authorization` header value.
    pub fn authenticate_header(&self, header: Option<&str>) -> Result<UserId, Error> {
        self.authenticate(header.and_then(bearer_token))
    }

    /// Mint a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: UserId) -> Result<String, Error> {
        let now = self.clock.now().timestamp();
        let claims = Claims { user_id, iat: now, exp: now + self.token_ttl_secs };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::InvalidInput(format!("failed to issue token: {e}")))
    }
}

/// Extract the credential from an `Authorization` value.
///
/// Accepts `Bearer <token>` or a bare token. Returns None when nothing is
/// left, including a header carrying only the scheme.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None if header.eq_ignore_ascii_case("bearer") => return None,
        None => header,
    };
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    const SECRET: &[u8] = b"test-secret-at-least-16";

    fn gate(clock: Arc<ManualClock>) -> IdentityGate {
        IdentityGate::new(SECRET, 3600).with_clock(clock)
    }

    #[test]
    fn test_round_trip() {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let gate = gate(clock);
        let token = gate.issue(42).unwrap();
        assert_eq!(gate.authenticate(Some(&token)).unwrap(), 42);
    }

    #[test]
    fn test_missing_token() {
        let gate = gate(Arc::new(ManualClock::at_epoch_2024()));
        assert!(matches!(gate.authenticate(None), Err(Error::MissingCredential)));
        assert!(matches!(gate.authenticate(Some("  ")), Err(Error::MissingCredential)));
        assert!(matches!(gate.authenticate_header(Some("Bearer ")), Err(Error::MissingCredential)));
    }

    #[test]
    fn test_wrong_secret() {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let token = IdentityGate::new(b"another-secret-entirely", 3600).with_clock(clock.clone()).issue(1).unwrap();
        let result = gate(clock).authenticate(Some(&token));
        assert!(matches!(result, Err(Error::InvalidCredential(_))));
    }

    #[test]
    fn test_garbage_token() {
        let gate = gate(Arc::new(ManualClock::at_epoch_2024()));
        assert!(matches!(gate.authenticate(Some("not.a.jwt")), Err(Error::InvalidCredential(_))));
    }

    #[test]
    fn test_expired_token() {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let gate = gate(clock.clone());
        let token = gate.issue(7).unwrap();

        clock.advance(Duration::seconds(3600));
        assert_eq!(gate.authenticate(Some(&token)).unwrap(), 7);

        clock.advance(Duration::seconds(1));
        assert!(matches!(gate.authenticate(Some(&token)), Err(Error::InvalidCredential(msg)) if msg.contains("expired")));
    }

    #[test]
    fn test_leeway_extends_expiry() {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let gate = gate(clock.clone()).with_leeway(30);
        let token = gate.issue(7).unwrap();
        clock.advance(Duration::seconds(3620));
        assert!(gate.authenticate(Some(&token)).is_ok());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token(""), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(" BEARER  "), None);
    }

    #[test]
    fn test_scheme_only_header_is_missing_credential() {
        let gate = IdentityGate::new(SECRET, 3600);
        assert!(matches!(gate.authenticate_header(Some("Bearer")), Err(Error::MissingCredential)));
        assert!(matches!(gate.authenticate_header(Some("bearer ")), Err(Error::MissingCredential)));
    }
}
