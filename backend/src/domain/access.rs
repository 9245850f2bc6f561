//! Access-control pipeline.
//!
//! Gates are pure functions of the request context: they admit or reject
//! before the guarded operation runs, enriching the context with the
//! validated subject on success. Gates never touch the storage engine;
//! role and ownership decisions use only the token claims.

use std::sync::Arc;

use super::error::Error;
use super::ids::UserId;
use super::token::TokenService;

/// Validated subject bound into the request after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    subject: UserId,
    is_admin: bool,
}

impl AuthContext {
    /// Build a context from validated claims.
    pub fn new(subject: UserId, is_admin: bool) -> Self {
        Self { subject, is_admin }
    }

    /// The authenticated user id.
    pub fn subject(&self) -> &UserId {
        &self.subject
    }

    /// Admin flag carried by the token claims.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Fail with `Forbidden` unless the subject holds the admin role.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin {
            Ok(())
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }
}

/// Explicit per-request context threaded through the gate chain.
///
/// Carries the raw bearer credential in and, once the authenticated gate
/// has run, the validated [`AuthContext`] out. No ambient or global state
/// is involved.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    credential: Option<String>,
    auth: Option<AuthContext>,
}

impl RequestContext {
    /// Context for a request carrying no credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context carrying a bearer token value.
    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            credential: Some(token.into()),
            auth: None,
        }
    }

    /// Build a context from a raw `Authorization` header value.
    ///
    /// Strips a leading `Bearer ` prefix; a missing header yields an
    /// anonymous context that the authenticated gate will reject.
    pub fn from_authorization_header(header: Option<&str>) -> Self {
        match header {
            None => Self::anonymous(),
            Some(value) => {
                let token = value.strip_prefix("Bearer ").unwrap_or(value);
                Self::with_bearer(token)
            }
        }
    }

    /// Raw credential, when one was supplied.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Validated subject, present once the authenticated gate has passed.
    pub fn auth(&self) -> Option<&AuthContext> {
        self.auth.as_ref()
    }

    /// Consume the context, yielding the validated subject.
    ///
    /// Fails with `Unauthorized` when no gate has bound a subject yet.
    pub fn into_auth(self) -> Result<AuthContext, Error> {
        self.auth
            .ok_or_else(|| Error::unauthorized("authorization required"))
    }

    fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// A pipeline stage that admits or rejects a request.
///
/// Implementations must be pure: no side effects beyond enriching the
/// returned context, and no storage access.
pub trait Gate: Send + Sync {
    /// Admit the request, possibly enriching the context, or reject it.
    fn admit(&self, ctx: RequestContext) -> Result<RequestContext, Error>;
}

/// Requires a well-formed, unexpired bearer token.
///
/// On success the validated subject id and admin flag are bound into the
/// context for downstream gates and the guarded operation.
pub struct AuthenticatedGate {
    tokens: Arc<TokenService>,
}

impl AuthenticatedGate {
    /// Build the gate over a token service.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl Gate for AuthenticatedGate {
    fn admit(&self, ctx: RequestContext) -> Result<RequestContext, Error> {
        let Some(credential) = ctx.credential() else {
            return Err(Error::unauthorized("authorization required"));
        };

        let claims = self.tokens.validate(credential)?;
        let subject = UserId::new(claims.subject())
            .map_err(|_| Error::unauthorized("invalid token"))?;
        let auth = AuthContext::new(subject, claims.is_admin());
        Ok(ctx.with_auth(auth))
    }
}

/// Requires the ambient admin flag bound by [`AuthenticatedGate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminGate;

impl Gate for AdminGate {
    fn admit(&self, ctx: RequestContext) -> Result<RequestContext, Error> {
        match ctx.auth() {
            Some(auth) => {
                auth.require_admin()?;
                Ok(ctx)
            }
            None => Err(Error::forbidden("admin access required")),
        }
    }
}

/// Ordered gate composition, short-circuiting on the first rejection.
pub struct GateChain {
    gates: Vec<Box<dyn Gate>>,
}

impl GateChain {
    /// Compose a chain from ordered gates.
    pub fn new(gates: Vec<Box<dyn Gate>>) -> Self {
        Self { gates }
    }

    /// Chain admitting any authenticated subject.
    pub fn authenticated(tokens: Arc<TokenService>) -> Self {
        Self::new(vec![Box::new(AuthenticatedGate::new(tokens))])
    }

    /// Chain admitting only authenticated admins.
    pub fn admin(tokens: Arc<TokenService>) -> Self {
        Self::new(vec![
            Box::new(AuthenticatedGate::new(tokens)),
            Box::new(AdminGate),
        ])
    }
}

impl Gate for GateChain {
    fn admit(&self, ctx: RequestContext) -> Result<RequestContext, Error> {
        self.gates
            .iter()
            .try_fold(ctx, |ctx, gate| gate.admit(ctx))
    }
}
