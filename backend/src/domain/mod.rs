//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed entities used by the persistence layer and
//! by inbound adapters. Types are immutable; invariants and serialisation
//! contracts (serde) are documented on each type. Services here own the
//! business rules; they reach storage only through the ports in
//! [`ports`].

pub mod access;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod ids;
pub mod password;
pub mod ports;
pub mod question;
pub mod questionnaire_service;
pub mod submission;
pub mod token;
pub mod user;

pub use self::access::{AdminGate, AuthContext, AuthenticatedGate, Gate, GateChain, RequestContext};
pub use self::account_service::{AccountService, Profile, RegisteredAccount};
pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{IdValidationError, QuestionId, SubmissionId, UserId};
pub use self::password::{PasswordDigest, PasswordDigestError, PasswordService};
pub use self::ports::{QuestionRepository, SubmissionRepository, UserRepository};
pub use self::question::{Question, QuestionDraft, QuestionKind, QuestionValidationError};
pub use self::questionnaire_service::{QuestionnaireService, SubmissionReceipt};
pub use self::submission::{Answer, Submission};
pub use self::token::{Claims, SessionToken, TokenConfigError, TokenService};
pub use self::user::{DisplayName, EmailAddress, NewUser, User, UserValidationError};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
