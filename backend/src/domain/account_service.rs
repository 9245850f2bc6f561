//! Account lifecycle: registration, login, and profile management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::access::AuthContext;
use super::auth::{LoginCredentials, Registration};
use super::error::{Error, ErrorCode};
use super::ids::UserId;
use super::password::PasswordService;
use super::ports::UserRepository;
use super::token::{SessionToken, TokenService};
use super::user::{DisplayName, NewUser, User};

/// Profile view of a user.
///
/// Deliberately excludes the email and the password digest; this is the
/// shape handed to adapters for the subject's own profile and for admin
/// listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Optional picture reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Admin flag.
    pub is_admin: bool,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            name: user.name().as_ref().to_owned(),
            picture: user.picture().map(str::to_owned),
            is_admin: user.is_admin(),
            created: user.created(),
        }
    }
}

/// Result of a successful registration.
#[derive(Debug)]
pub struct RegisteredAccount {
    /// Identifier assigned to the new user.
    pub user_id: UserId,
    /// Session token issued immediately for the new account.
    pub token: SessionToken,
}

/// Registration, login, and profile operations.
pub struct AccountService<U> {
    users: Arc<U>,
    passwords: Arc<PasswordService>,
    tokens: Arc<TokenService>,
}

impl<U> Clone for AccountService<U> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            passwords: self.passwords.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<U> AccountService<U> {
    /// Create the service over its collaborators.
    pub fn new(users: Arc<U>, passwords: Arc<PasswordService>, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    /// Register a new account and issue a session token for it.
    ///
    /// Accounts are always created without the admin role. Fails with
    /// `Conflict` when the email is already registered.
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredAccount, Error> {
        let digest = self.passwords.hash(registration.password())?;
        let user = self
            .users
            .create(NewUser {
                id: None,
                email: registration.email().clone(),
                password: digest,
                name: registration.name().clone(),
                picture: None,
                is_admin: false,
            })
            .await?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id(), "account registered");
        Ok(RegisteredAccount {
            user_id: user.id().clone(),
            token,
        })
    }

    /// Authenticate credentials and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller: both fail with the same `Unauthorized` message.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<SessionToken, Error> {
        let user = match self.users.find_by_email(credentials.email()).await {
            Ok(user) => user,
            Err(err) if err.code() == ErrorCode::NotFound => {
                return Err(Error::unauthorized("invalid credentials"));
            }
            Err(err) => return Err(err),
        };

        if !self.passwords.verify(credentials.password(), user.password()) {
            return Err(Error::unauthorized("invalid credentials"));
        }

        tracing::debug!(user_id = %user.id(), "login succeeded");
        self.tokens.issue(&user)
    }

    /// Profile of the authenticated subject.
    pub async fn profile(&self, ctx: &AuthContext) -> Result<Profile, Error> {
        let user = self.users.find_by_id(ctx.subject()).await?;
        Ok(Profile::from(&user))
    }

    /// Replace the subject's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &AuthContext,
        name: DisplayName,
        picture: Option<String>,
    ) -> Result<Profile, Error> {
        let user = self
            .users
            .update_profile(ctx.subject(), name, picture)
            .await?;
        tracing::info!(user_id = %user.id(), "profile updated");
        Ok(Profile::from(&user))
    }

    /// All user profiles; admin only.
    pub async fn list_users(&self, ctx: &AuthContext) -> Result<Vec<Profile>, Error> {
        ctx.require_admin()?;
        let users = self.users.list_all().await?;
        Ok(users.iter().map(Profile::from).collect())
    }
}
