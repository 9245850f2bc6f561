//! Repository ports at the edge of the domain.
//!
//! Repositories are stateless façades over the storage engine: every call
//! opens its own transaction and no documents are cached between calls.
//! Adapters fail with the domain [`Error`] taxonomy directly so services
//! never translate a second error vocabulary.

use async_trait::async_trait;

use super::error::Error;
use super::ids::{QuestionId, SubmissionId, UserId};
use super::question::{Question, QuestionDraft};
use super::submission::{Answer, Submission};
use super::user::{DisplayName, EmailAddress, NewUser, User};

/// Persistence port for user identity records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new identity record.
    ///
    /// Enforces email uniqueness inside the write transaction; fails with
    /// `Conflict` when the address is already registered. Assigns the
    /// identifier when absent and stamps the creation time.
    async fn create(&self, candidate: NewUser) -> Result<User, Error>;

    /// Point lookup by id; `NotFound` when absent.
    async fn find_by_id(&self, id: &UserId) -> Result<User, Error>;

    /// Full-scan lookup by email in storage key order.
    ///
    /// Returns the first matching record; `NotFound` when none matches.
    /// Key order is not insertion order, so "first" only means "some
    /// matching record".
    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Replace the profile fields in one read-modify-write transaction.
    async fn update_profile(
        &self,
        id: &UserId,
        name: DisplayName,
        picture: Option<String>,
    ) -> Result<User, Error>;

    /// All stored users in storage key order.
    async fn list_all(&self) -> Result<Vec<User>, Error>;
}

/// Persistence port for question definitions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Validate and persist a question; assigns the id when absent.
    async fn create(&self, draft: QuestionDraft) -> Result<Question, Error>;

    /// Revalidate and replace an existing question.
    ///
    /// The stored identifier wins over any id in the draft; `NotFound`
    /// when the id is absent.
    async fn update(&self, id: &QuestionId, draft: QuestionDraft) -> Result<Question, Error>;

    /// Remove a question; `NotFound` when absent.
    async fn delete(&self, id: &QuestionId) -> Result<(), Error>;

    /// All stored questions in storage key order; empty when none exist.
    async fn list_all(&self) -> Result<Vec<Question>, Error>;
}

/// Persistence port for questionnaire submissions.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Validate answers against the question collection and persist.
    ///
    /// Fails with `invalid_request` naming the offending id when any
    /// answer references a question that does not exist at submission
    /// time. Assigns the id and creation stamp.
    async fn create(&self, user_id: &UserId, answers: Vec<Answer>) -> Result<Submission, Error>;

    /// Submissions owned by a user; empty when none exist.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Submission>, Error>;

    /// All stored submissions in storage key order.
    async fn list_all(&self) -> Result<Vec<Submission>, Error>;

    /// Point lookup by id; `NotFound` when absent.
    async fn find_by_id(&self, id: &SubmissionId) -> Result<Submission, Error>;
}
