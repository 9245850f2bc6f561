//! Authentication payloads: login credentials and registration requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use zeroize::Zeroizing;

use super::user::{DisplayName, EmailAddress, UserValidationError};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email or display name failed the user field shape checks.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] characters.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// The enforced minimum.
        min: usize,
    },
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` satisfies the [`EmailAddress`] shape checks.
/// - `password` is non-empty but otherwise untouched; whitespace is kept
///   to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use tiramisu_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("a@x.com", "secret1").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@x.com");
/// assert_eq!(creds.password(), "secret1");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password as provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
///
/// Registration enforces the password minimum length on top of the login
/// credential checks; accounts are always created without the admin role.
#[derive(Debug, Clone)]
pub struct Registration {
    email: EmailAddress,
    password: Zeroizing<String>,
    name: DisplayName,
}

impl Registration {
    /// Construct a registration request from raw inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let name = DisplayName::new(name)?;

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            name,
        })
    }

    /// Email address to register.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password; hashed by the account service, never stored.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Display name for the new account.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for credential validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case("not-an-email", "pw")]
    fn login_rejects_bad_emails(#[case] email: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid email must fail");
        assert!(matches!(err, CredentialsValidationError::User(_)));
    }

    #[rstest]
    fn login_rejects_empty_password() {
        let err =
            LoginCredentials::try_from_parts("a@x.com", "").expect_err("empty password must fail");
        assert_eq!(err, CredentialsValidationError::EmptyPassword);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("a@x.com", " secret ")
            .expect("valid credentials");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    #[case("12345")]
    #[case("a")]
    fn registration_rejects_short_passwords(#[case] password: &str) {
        let err = Registration::try_from_parts("a@x.com", password, "Ada")
            .expect_err("short password must fail");
        assert_eq!(
            err,
            CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN }
        );
    }

    #[rstest]
    fn registration_rejects_blank_name() {
        let err = Registration::try_from_parts("a@x.com", "secret1", "  ")
            .expect_err("blank name must fail");
        assert_eq!(
            err,
            CredentialsValidationError::User(UserValidationError::EmptyDisplayName)
        );
    }

    #[rstest]
    fn registration_accepts_valid_input() {
        let registration = Registration::try_from_parts("a@x.com", "secret1", "Ada")
            .expect("valid registration");
        assert_eq!(registration.email().as_ref(), "a@x.com");
        assert_eq!(registration.name().as_ref(), "Ada");
    }
}
