//! Application assembly.
//!
//! [`AppContext`] wires the storage engine, repositories, services, and
//! gate chains together from an [`AppConfig`]. Inbound adapters hold one
//! context and thread each request through a gate chain before calling a
//! service.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error as ThisError;
use zeroize::Zeroizing;

use crate::config::AppConfig;
use crate::domain::{
    AccountService, GateChain, PasswordService, QuestionnaireService, TokenConfigError,
    TokenService,
};
use crate::outbound::persistence::{
    EngineError, RedbQuestionRepository, RedbSubmissionRepository, RedbUserRepository,
    StorageEngine,
};

/// Startup failures. Each aborts the process before any request is served.
#[derive(Debug, ThisError)]
pub enum BootstrapError {
    /// No token signing secret was configured.
    #[error("token secret must be configured")]
    MissingTokenSecret,
    /// The database could not be opened.
    #[error("storage initialisation failed: {0}")]
    Storage(#[from] EngineError),
    /// The token service rejected its configuration.
    #[error("token service initialisation failed: {0}")]
    Token(#[from] TokenConfigError),
}

/// Assembled services and gate chains for one running instance.
#[derive(Clone)]
pub struct AppContext {
    accounts: AccountService<RedbUserRepository>,
    questionnaires: QuestionnaireService<RedbQuestionRepository, RedbSubmissionRepository>,
    tokens: Arc<TokenService>,
}

impl AppContext {
    /// Assemble the application from configuration using the system clock.
    pub fn bootstrap(config: &AppConfig) -> Result<Self, BootstrapError> {
        Self::bootstrap_with_clock(config, Arc::new(DefaultClock))
    }

    /// Assemble the application with an explicit clock.
    ///
    /// Tests inject a frozen clock here to make issue and expiry times
    /// deterministic.
    pub fn bootstrap_with_clock(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BootstrapError> {
        let secret = config
            .token_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| Zeroizing::new(secret.as_bytes().to_vec()))
            .ok_or(BootstrapError::MissingTokenSecret)?;

        let db_path = config.db_path();
        let engine = Arc::new(StorageEngine::open(&db_path)?);
        tracing::info!(path = %db_path.display(), "storage engine opened");

        let tokens = Arc::new(TokenService::new(
            &secret,
            config.token_ttl(),
            clock.clone(),
        )?);
        let passwords = Arc::new(PasswordService::new());

        let users = Arc::new(RedbUserRepository::new(engine.clone(), clock.clone()));
        let questions = Arc::new(RedbQuestionRepository::new(engine.clone()));
        let submissions = Arc::new(RedbSubmissionRepository::new(engine, clock));

        Ok(Self {
            accounts: AccountService::new(users, passwords, tokens.clone()),
            questionnaires: QuestionnaireService::new(questions, submissions),
            tokens,
        })
    }

    /// Account registration, login, and profile operations.
    pub fn accounts(&self) -> &AccountService<RedbUserRepository> {
        &self.accounts
    }

    /// Question administration and submission operations.
    pub fn questionnaires(
        &self,
    ) -> &QuestionnaireService<RedbQuestionRepository, RedbSubmissionRepository> {
        &self.questionnaires
    }

    /// Gate chain admitting any authenticated subject.
    pub fn authenticated_gate(&self) -> GateChain {
        GateChain::authenticated(self.tokens.clone())
    }

    /// Gate chain admitting only authenticated admins.
    pub fn admin_gate(&self) -> GateChain {
        GateChain::admin(self.tokens.clone())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
