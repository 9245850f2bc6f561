//! Completed questionnaire submissions.
//!
//! A submission is created once by its owning user and never mutated.
//! Answers reference question ids that must exist at submission time;
//! later question deletion does not retroactively invalidate a stored
//! submission. Stored field names follow the historical document layout
//! (`id` for the referenced question, `question` for the answer content).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{QuestionId, SubmissionId, UserId};

/// A single answer within a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Answer {
    #[serde(rename = "id")]
    question_id: QuestionId,
    #[serde(rename = "question")]
    value: String,
}

impl Answer {
    /// Build an answer referencing a question.
    pub fn new(question_id: QuestionId, value: impl Into<String>) -> Self {
        Self {
            question_id,
            value: value.into(),
        }
    }

    /// Referenced question id.
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    /// Free-form answer content.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Stored submission record.
///
/// ## Invariants
/// - Immutable once persisted.
/// - Every answer referenced an existing question when the submission was
///   created (validated by the submission repository, not stored as a
///   foreign key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Submission {
    id: SubmissionId,
    user_id: UserId,
    answers: Vec<Answer>,
    created_at: DateTime<Utc>,
}

impl Submission {
    /// Assemble a stored submission record.
    pub fn new(
        id: SubmissionId,
        user_id: UserId,
        answers: Vec<Answer>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            answers,
            created_at,
        }
    }

    /// Stable submission identifier.
    pub fn id(&self) -> &SubmissionId {
        &self.id
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Ordered answers as submitted.
    pub fn answers(&self) -> &[Answer] {
        self.answers.as_slice()
    }

    /// Creation timestamp assigned by the submission repository.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
