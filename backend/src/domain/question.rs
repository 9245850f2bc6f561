//! Question definitions.
//!
//! Questions are configured by administrators and answered by users. The
//! kind set is closed; today only `scale` exists, and scale questions must
//! carry non-zero bounds. The stored document layout keeps the historical
//! field names (`question` for the prompt, `type` for the kind).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::QuestionId;

/// Closed set of recognised question kinds.
///
/// Unknown kinds fail serde deserialisation, so type membership is
/// enforced at every boundary that decodes a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Numeric scale between a configured min and max.
    Scale,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale => f.write_str("scale"),
        }
    }
}

/// Validation errors for question definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionValidationError {
    /// A scale question was configured with a zero min or max.
    #[error("scale questions require non-zero min and max values")]
    ScaleBoundsRequired,
}

/// Stored question definition.
///
/// ## Invariants
/// - `kind` is a member of [`QuestionKind`].
/// - For [`QuestionKind::Scale`], `min` and `max` are both non-zero.
///   Nothing orders `min` below `max`; that gap is retained deliberately
///   (see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    id: QuestionId,
    #[serde(rename = "question")]
    prompt: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    #[serde(default)]
    min: i64,
    #[serde(default)]
    max: i64,
}

impl Question {
    /// Assemble a stored question from an already-validated draft.
    pub fn from_draft(id: QuestionId, draft: QuestionDraft) -> Self {
        Self {
            id,
            prompt: draft.prompt,
            kind: draft.kind,
            min: draft.min,
            max: draft.max,
        }
    }

    /// Stable question identifier.
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Prompt text shown to users.
    pub fn prompt(&self) -> &str {
        self.prompt.as_str()
    }

    /// Question kind.
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Lower scale bound.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper scale bound.
    pub fn max(&self) -> i64 {
        self.max
    }
}

/// Candidate question handed to the question repository.
///
/// Create assigns an identifier when `id` is `None`; update ignores `id`
/// entirely and keeps the stored identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// Pre-assigned identifier, normally `None`.
    pub id: Option<QuestionId>,
    /// Prompt text.
    pub prompt: String,
    /// Question kind.
    pub kind: QuestionKind,
    /// Lower scale bound; required non-zero for scale questions.
    pub min: i64,
    /// Upper scale bound; required non-zero for scale questions.
    pub max: i64,
}

impl QuestionDraft {
    /// Build a scale question draft.
    pub fn scale(prompt: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            id: None,
            prompt: prompt.into(),
            kind: QuestionKind::Scale,
            min,
            max,
        }
    }

    /// Check the kind-specific invariants.
    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        match self.kind {
            QuestionKind::Scale if self.min == 0 || self.max == 0 => {
                Err(QuestionValidationError::ScaleBoundsRequired)
            }
            QuestionKind::Scale => Ok(()),
        }
    }
}
