//! User identity model.
//!
//! A [`User`] is the stored identity record: validated email, one-way
//! password digest, profile fields, admin flag, and creation stamp. The
//! serde layout matches the persisted document format, so a decoded
//! document is revalidated field by field through the newtypes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Email was empty once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email had surrounding whitespace or no `local@domain` shape.
    #[error("email must have a local part and a domain separated by '@'")]
    MalformedEmail,
    /// Display name was empty once trimmed.
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// Stored email address.
///
/// ## Invariants
/// - Non-empty, no surrounding whitespace.
/// - Contains exactly one `@` with non-empty local part and domain.
/// - Case-sensitive as stored: no normalisation is applied, and the
///   uniqueness scan compares addresses byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.trim() != email {
            return Err(UserValidationError::MalformedEmail);
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(UserValidationError::MalformedEmail),
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Stored user identity record.
///
/// ## Invariants
/// - `email` is unique across the `users` collection (enforced by the
///   identity repository inside its write transaction, not by this type).
/// - `password` is a one-way digest; the plaintext is never stored.
///
/// Users are never hard-deleted; mutation is limited to profile updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    password: super::password::PasswordDigest,
    name: DisplayName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    is_admin: bool,
    created: DateTime<Utc>,
}

impl User {
    /// Assemble a stored record from validated components.
    pub fn new(
        id: UserId,
        email: EmailAddress,
        password: super::password::PasswordDigest,
        name: DisplayName,
        picture: Option<String>,
        is_admin: bool,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password,
            name,
            picture,
            is_admin,
            created,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Stored email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// One-way password digest.
    pub fn password(&self) -> &super::password::PasswordDigest {
        &self.password
    }

    /// Display name shown to other users.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Optional picture reference.
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Whether the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Creation timestamp assigned by the identity repository.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Return a copy with the profile fields replaced.
    ///
    /// Identity, credentials, role, and creation stamp are preserved;
    /// only the profile is caller-mutable.
    pub fn with_profile(mut self, name: DisplayName, picture: Option<String>) -> Self {
        self.name = name;
        self.picture = picture;
        self
    }
}

/// Candidate identity record handed to the identity repository.
///
/// The repository assigns the identifier when absent and stamps the
/// creation time; callers never pick either.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Pre-assigned identifier, normally `None`.
    pub id: Option<UserId>,
    /// Email address to register; uniqueness is checked at create time.
    pub email: EmailAddress,
    /// One-way password digest produced by the password service.
    pub password: super::password::PasswordDigest,
    /// Display name.
    pub name: DisplayName,
    /// Optional picture reference.
    pub picture: Option<String>,
    /// Admin flag; registration always passes `false`.
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    //! Validation and document-layout coverage for the user model.
    use super::super::password::PasswordDigest;
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("plainaddress", UserValidationError::MalformedEmail)]
    #[case("@example.com", UserValidationError::MalformedEmail)]
    #[case("user@", UserValidationError::MalformedEmail)]
    #[case(" user@example.com", UserValidationError::MalformedEmail)]
    fn invalid_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = EmailAddress::new(raw).expect_err("invalid email must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn email_is_stored_case_sensitively() {
        let upper = EmailAddress::new("User@Example.com").expect("valid email");
        let lower = EmailAddress::new("user@example.com").expect("valid email");
        assert_ne!(upper, lower);
    }

    #[rstest]
    #[case("")]
    #[case("  \t ")]
    fn blank_display_names_rejected(#[case] raw: &str) {
        let err = DisplayName::new(raw).expect_err("blank name must fail");
        assert_eq!(err, UserValidationError::EmptyDisplayName);
    }

    fn sample_user() -> User {
        User::new(
            UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id"),
            EmailAddress::new("a@x.com").expect("valid email"),
            PasswordDigest::new("$argon2id$v=19$m=19456,t=2,p=1$abc$def").expect("valid digest"),
            DisplayName::new("Ada Lovelace").expect("valid name"),
            None,
            false,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid time"),
        )
    }

    #[rstest]
    fn document_layout_uses_storage_field_names() {
        let value = serde_json::to_value(sample_user()).expect("serialises");
        assert_eq!(value["id"], "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["name"], "Ada Lovelace");
        assert_eq!(value["is_admin"], false);
        assert!(value.get("picture").is_none());
        assert!(value["password"].as_str().is_some());
    }

    #[rstest]
    fn with_profile_replaces_only_profile_fields() {
        let user = sample_user();
        let updated = user.clone().with_profile(
            DisplayName::new("Grace Hopper").expect("valid name"),
            Some("avatar.png".to_owned()),
        );

        assert_eq!(updated.id(), user.id());
        assert_eq!(updated.email(), user.email());
        assert_eq!(updated.created(), user.created());
        assert_eq!(updated.name().as_ref(), "Grace Hopper");
        assert_eq!(updated.picture(), Some("avatar.png"));
    }
}
