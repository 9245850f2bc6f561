//! Questionnaire operations: question administration and submissions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::access::AuthContext;
use super::error::Error;
use super::ids::{QuestionId, SubmissionId};
use super::ports::{QuestionRepository, SubmissionRepository};
use super::question::{Question, QuestionDraft};
use super::submission::{Answer, Submission};

/// Confirmation returned for a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    /// Identifier assigned to the submission.
    pub id: SubmissionId,
    /// Creation timestamp assigned by the repository.
    pub created_at: DateTime<Utc>,
}

/// Question administration and submission operations.
///
/// Authentication has already happened by the time these methods run; the
/// [`AuthContext`] parameter carries the validated subject. Role and
/// ownership rules are enforced here so they hold for every adapter.
pub struct QuestionnaireService<Q, S> {
    questions: Arc<Q>,
    submissions: Arc<S>,
}

impl<Q, S> Clone for QuestionnaireService<Q, S> {
    fn clone(&self) -> Self {
        Self {
            questions: self.questions.clone(),
            submissions: self.submissions.clone(),
        }
    }
}

impl<Q, S> QuestionnaireService<Q, S> {
    /// Create the service over its repositories.
    pub fn new(questions: Arc<Q>, submissions: Arc<S>) -> Self {
        Self {
            questions,
            submissions,
        }
    }
}

impl<Q, S> QuestionnaireService<Q, S>
where
    Q: QuestionRepository,
    S: SubmissionRepository,
{
    /// All configured questions in storage key order.
    pub async fn list_questions(&self) -> Result<Vec<Question>, Error> {
        self.questions.list_all().await
    }

    /// Create a question definition; admin only.
    pub async fn create_question(
        &self,
        ctx: &AuthContext,
        draft: QuestionDraft,
    ) -> Result<Question, Error> {
        ctx.require_admin()?;
        let question = self.questions.create(draft).await?;
        tracing::info!(question_id = %question.id(), "question created");
        Ok(question)
    }

    /// Replace a question definition; admin only.
    pub async fn update_question(
        &self,
        ctx: &AuthContext,
        id: &QuestionId,
        draft: QuestionDraft,
    ) -> Result<Question, Error> {
        ctx.require_admin()?;
        let question = self.questions.update(id, draft).await?;
        tracing::info!(question_id = %question.id(), "question updated");
        Ok(question)
    }

    /// Delete a question definition; admin only.
    ///
    /// Existing submissions answering the question are unaffected.
    pub async fn delete_question(&self, ctx: &AuthContext, id: &QuestionId) -> Result<(), Error> {
        ctx.require_admin()?;
        self.questions.delete(id).await?;
        tracing::info!(question_id = %id, "question deleted");
        Ok(())
    }

    /// Store the subject's completed answer set.
    pub async fn submit(
        &self,
        ctx: &AuthContext,
        answers: Vec<Answer>,
    ) -> Result<SubmissionReceipt, Error> {
        let submission = self.submissions.create(ctx.subject(), answers).await?;
        tracing::info!(
            submission_id = %submission.id(),
            user_id = %submission.user_id(),
            "submission stored"
        );
        Ok(SubmissionReceipt {
            id: submission.id().clone(),
            created_at: submission.created_at(),
        })
    }

    /// Submissions owned by the authenticated subject.
    pub async fn own_submissions(&self, ctx: &AuthContext) -> Result<Vec<Submission>, Error> {
        self.submissions.list_for_user(ctx.subject()).await
    }

    /// A single submission, readable by its owner or an admin.
    pub async fn submission(
        &self,
        ctx: &AuthContext,
        id: &SubmissionId,
    ) -> Result<Submission, Error> {
        let submission = self.submissions.find_by_id(id).await?;
        if !ctx.is_admin() && submission.user_id() != ctx.subject() {
            return Err(Error::forbidden("access denied"));
        }
        Ok(submission)
    }

    /// All submissions; admin only.
    pub async fn list_submissions(&self, ctx: &AuthContext) -> Result<Vec<Submission>, Error> {
        ctx.require_admin()?;
        self.submissions.list_all().await
    }
}
