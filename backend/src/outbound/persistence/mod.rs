//! Storage adapters implementing the domain repository ports over
//! [`engine::StorageEngine`].
//!
//! Each repository call opens its own transaction; invariants that span
//! documents (email uniqueness, answer references) are checked inside the
//! single write transaction so they cannot race with concurrent writers.
//! Storage failures are logged here and collapsed into the generic
//! internal domain error so no engine detail leaks to callers.

pub mod engine;
mod redb_question_repository;
mod redb_submission_repository;
mod redb_user_repository;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::Error;

pub use self::engine::{Collection, EngineError, StorageEngine};
pub use self::redb_question_repository::RedbQuestionRepository;
pub use self::redb_submission_repository::RedbSubmissionRepository;
pub use self::redb_user_repository::RedbUserRepository;

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        tracing::error!(error = %err, "storage engine failure");
        Self::internal("storage failure")
    }
}

/// Encode an entity as a stored JSON document.
fn to_document<T: Serialize>(entity: &T) -> Result<Vec<u8>, EngineError> {
    Ok(serde_json::to_vec(entity)?)
}

/// Decode a stored JSON document back into its entity.
///
/// Decoding runs the entity's serde validation, so a corrupt or
/// hand-edited document surfaces as an engine codec error rather than an
/// invalid in-memory value.
fn from_document<T: DeserializeOwned>(document: &[u8]) -> Result<T, EngineError> {
    Ok(serde_json::from_slice(document)?)
}
