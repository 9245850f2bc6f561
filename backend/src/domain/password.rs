//! Salted one-way password hashing.
//!
//! Digests are Argon2id PHC strings with a per-hash random salt. Hashing
//! can only fail on parameter or entropy problems, which are surfaced as
//! internal errors; verification never errors, it just returns `false`
//! for mismatches and undecodable digests.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use serde::{Deserialize, Serialize};

use super::error::Error;

/// Validation errors for stored digests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordDigestError {
    /// The digest string was empty.
    #[error("password digest must not be empty")]
    Empty,
}

/// Opaque one-way password digest.
///
/// The plaintext is never recoverable from this value. `Debug` is
/// redacted so digests cannot leak through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an existing digest string.
    pub fn new(digest: impl Into<String>) -> Result<Self, PasswordDigestError> {
        let digest = digest.into();
        if digest.is_empty() {
            return Err(PasswordDigestError::Empty);
        }
        Ok(Self(digest))
    }
}

impl AsRef<str> for PasswordDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordDigest").field(&"[REDACTED]").finish()
    }
}

impl From<PasswordDigest> for String {
    fn from(value: PasswordDigest) -> Self {
        value.0
    }
}

impl TryFrom<String> for PasswordDigest {
    type Error = PasswordDigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Argon2id password hashing service.
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    hasher: Argon2<'static>,
}

impl PasswordService {
    /// Create a service with the default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordDigest, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| {
                tracing::error!(error = %err, "password hashing failed");
                Error::internal("password hashing failed")
            })?;
        PasswordDigest::new(hash.to_string()).map_err(|err| {
            tracing::error!(error = %err, "password hasher produced an empty digest");
            Error::internal("password hashing failed")
        })
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// Returns `false` for mismatches and for digests that fail to parse;
    /// it never errors, so callers cannot distinguish the two cases.
    pub fn verify(&self, plaintext: &str, digest: &PasswordDigest) -> bool {
        let Ok(parsed) = PasswordHash::new(digest.as_ref()) else {
            return false;
        };
        self.hasher
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    //! Hash/verify round-trip coverage.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> PasswordService {
        PasswordService::new()
    }

    #[rstest]
    fn hash_then_verify_round_trips(service: PasswordService) {
        let digest = service.hash("secret1").expect("hashing succeeds");
        assert!(service.verify("secret1", &digest));
    }

    #[rstest]
    fn wrong_password_fails_verification(service: PasswordService) {
        let digest = service.hash("secret1").expect("hashing succeeds");
        assert!(!service.verify("secret2", &digest));
    }

    #[rstest]
    fn garbage_digest_fails_without_panicking(service: PasswordService) {
        let digest = PasswordDigest::new("not-a-phc-string").expect("non-empty digest");
        assert!(!service.verify("secret1", &digest));
    }

    #[rstest]
    fn same_password_hashes_to_distinct_digests(service: PasswordService) {
        let first = service.hash("secret1").expect("hashing succeeds");
        let second = service.hash("secret1").expect("hashing succeeds");
        // Fresh salts per hash.
        assert_ne!(first, second);
    }

    #[rstest]
    fn digests_never_contain_the_plaintext(service: PasswordService) {
        let digest = service.hash("hunter2-plaintext").expect("hashing succeeds");
        assert!(!digest.as_ref().contains("hunter2-plaintext"));
    }

    #[rstest]
    fn debug_output_is_redacted() {
        let digest = PasswordDigest::new("$argon2id$v=19$m=19456,t=2,p=1$abc$def")
            .expect("non-empty digest");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(\"[REDACTED]\")");
    }
}
