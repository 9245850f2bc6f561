//! Signed, time-bound session tokens.
//!
//! A token is `base64url(claims-json).base64url(hmac-sha256(claims))`,
//! signed with a server-held secret. Claims are self-contained: validation
//! never consults storage, so a token may be stale relative to a
//! since-demoted user. That trust window is bounded by the expiry; there
//! is no revocation list.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::error::Error;
use super::user::User;

type HmacSha256 = Hmac<Sha256>;

/// Token service construction errors. Fatal at startup, never per-request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenConfigError {
    /// The signing secret was empty.
    #[error("token signing secret must not be empty")]
    EmptySecret,
}

/// Decoded, verified token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    sub: String,
    admin: bool,
    iat: i64,
    exp: i64,
}

impl Claims {
    /// Subject identifier (the user id the token was issued for).
    pub fn subject(&self) -> &str {
        self.sub.as_str()
    }

    /// Admin role claim captured at issue time.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Issue time as Unix seconds.
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Expiry as Unix seconds.
    pub fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// An issued session token.
///
/// `Debug` is redacted; a logged token is a usable credential.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Borrow the encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SessionToken> for String {
    fn from(value: SessionToken) -> Self {
        value.0
    }
}

/// Issues and validates signed session tokens.
pub struct TokenService {
    key: Zeroizing<Vec<u8>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a token service.
    ///
    /// Fails when `secret` is empty; an unconfigured secret must abort
    /// startup rather than sign tokens with a guessable key.
    pub fn new(
        secret: &[u8],
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenConfigError> {
        if secret.is_empty() {
            return Err(TokenConfigError::EmptySecret);
        }
        Ok(Self {
            key: Zeroizing::new(secret.to_vec()),
            ttl,
            clock,
        })
    }

    /// Issue a token carrying the user's id and admin flag.
    pub fn issue(&self, user: &User) -> Result<SessionToken, Error> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: user.id().to_string(),
            admin: user.is_admin(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let body = serde_json::to_vec(&claims).map_err(|err| {
            tracing::error!(error = %err, "failed to encode token claims");
            Error::internal("token issuance failed")
        })?;
        let payload = URL_SAFE_NO_PAD.encode(body);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        Ok(SessionToken(format!("{payload}.{signature}")))
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Malformed, forged, and expired tokens all fail with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    pub fn validate(&self, token: &str) -> Result<Claims, Error> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| Error::unauthorized("invalid token"))?;

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Error::unauthorized("invalid token"))?;

        // Signature first: claims are untrusted until the MAC checks out.
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature_bytes)
            .map_err(|_| Error::unauthorized("invalid token"))?;

        let body = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| Error::unauthorized("invalid token"))?;
        let claims: Claims =
            serde_json::from_slice(&body).map_err(|_| Error::unauthorized("invalid token"))?;

        if claims.exp <= self.clock.utc().timestamp() {
            return Err(Error::unauthorized("token expired"));
        }
        Ok(claims)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Token round-trip, tampering, and expiry coverage.
    use super::*;
    use crate::domain::password::PasswordDigest;
    use crate::domain::user::{DisplayName, EmailAddress};
    use crate::domain::UserId;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn frozen(at: DateTime<Utc>) -> Arc<dyn Clock> {
        Arc::new(FrozenClock(at))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn user(is_admin: bool) -> User {
        User::new(
            UserId::random(),
            EmailAddress::new("a@x.com").expect("valid email"),
            PasswordDigest::new("$argon2id$v=19$m=19456,t=2,p=1$abc$def").expect("valid digest"),
            DisplayName::new("Ada").expect("valid name"),
            None,
            is_admin,
            now(),
        )
    }

    #[fixture]
    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::hours(24), frozen(now()))
            .expect("valid secret")
    }

    #[rstest]
    fn empty_secret_is_rejected_at_construction() {
        let err = TokenService::new(b"", Duration::hours(1), frozen(now()))
            .expect_err("empty secret must fail");
        assert_eq!(err, TokenConfigError::EmptySecret);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn issue_validate_round_trips_subject_and_role(service: TokenService, #[case] admin: bool) {
        let user = user(admin);
        let token = service.issue(&user).expect("token issues");

        let claims = service.validate(token.as_str()).expect("token validates");
        assert_eq!(claims.subject(), user.id().as_ref());
        assert_eq!(claims.is_admin(), admin);
        assert_eq!(claims.issued_at(), now().timestamp());
        assert_eq!(claims.expires_at(), (now() + Duration::hours(24)).timestamp());
    }

    #[rstest]
    fn expired_tokens_fail_validation() {
        let issuer = TokenService::new(b"test-secret", Duration::hours(1), frozen(now()))
            .expect("valid secret");
        let token = issuer.issue(&user(false)).expect("token issues");

        let later = TokenService::new(
            b"test-secret",
            Duration::hours(1),
            frozen(now() + Duration::hours(2)),
        )
        .expect("valid secret");

        let err = later
            .validate(token.as_str())
            .expect_err("expired token must fail");
        assert_eq!(err.message(), "token expired");
    }

    #[rstest]
    fn foreign_secret_fails_validation(service: TokenService) {
        let forger = TokenService::new(b"other-secret", Duration::hours(24), frozen(now()))
            .expect("valid secret");
        let token = forger.issue(&user(true)).expect("token issues");

        let err = service
            .validate(token.as_str())
            .expect_err("forged token must fail");
        assert_eq!(err.message(), "invalid token");
    }

    #[rstest]
    fn tampered_payload_fails_validation(service: TokenService) {
        let token = service.issue(&user(false)).expect("token issues");
        let (_, signature) = token
            .as_str()
            .split_once('.')
            .expect("token has two segments");

        let forged_claims = serde_json::json!({
            "sub": UserId::random().as_ref(),
            "admin": true,
            "iat": now().timestamp(),
            "exp": (now() + Duration::hours(24)).timestamp(),
        });
        let forged_payload = URL_SAFE_NO_PAD.encode(forged_claims.to_string());
        let forged = format!("{forged_payload}.{signature}");

        let err = service
            .validate(&forged)
            .expect_err("tampered token must fail");
        assert_eq!(err.message(), "invalid token");
    }

    #[rstest]
    #[case("")]
    #[case("no-dot-separator")]
    #[case("a.b.c")]
    #[case("%%%.###")]
    fn malformed_tokens_fail_validation(service: TokenService, #[case] raw: &str) {
        let err = service.validate(raw).expect_err("malformed token must fail");
        assert_eq!(err.code(), crate::domain::ErrorCode::Unauthorized);
    }
}
