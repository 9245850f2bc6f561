//! Questionnaire submissions over the storage engine.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::{Answer, Error, Submission, SubmissionId, SubmissionRepository, UserId};

use super::{Collection, StorageEngine, from_document, to_document};

/// [`SubmissionRepository`] backed by the `submissions` collection.
///
/// Answer references are checked against the `questions` collection
/// inside the write transaction that stores the submission, so a
/// concurrent question deletion cannot slip between the check and the
/// insert.
pub struct RedbSubmissionRepository {
    engine: Arc<StorageEngine>,
    clock: Arc<dyn Clock>,
}

impl RedbSubmissionRepository {
    /// Create the repository over an opened engine.
    pub fn new(engine: Arc<StorageEngine>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }
}

#[async_trait]
impl SubmissionRepository for RedbSubmissionRepository {
    async fn create(&self, user_id: &UserId, answers: Vec<Answer>) -> Result<Submission, Error> {
        let created_at = self.clock.utc();
        self.engine.write(|view| {
            for answer in &answers {
                let referenced =
                    view.get(Collection::Questions, answer.question_id().as_ref())?;
                if referenced.is_none() {
                    return Err(Error::invalid_request(format!(
                        "invalid question id: {}",
                        answer.question_id()
                    )));
                }
            }

            let submission = Submission::new(
                SubmissionId::random(),
                user_id.clone(),
                answers,
                created_at,
            );
            view.put(
                Collection::Submissions,
                submission.id().as_ref(),
                &to_document(&submission)?,
            )?;
            Ok(submission)
        })
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Submission>, Error> {
        let all = self.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|submission| submission.user_id() == user_id)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Submission>, Error> {
        self.engine.read(|view| {
            view.scan(Collection::Submissions)?
                .iter()
                .map(|(_, document)| Ok(from_document(document)?))
                .collect()
        })
    }

    async fn find_by_id(&self, id: &SubmissionId) -> Result<Submission, Error> {
        self.engine.read(|view| {
            let document = view
                .get(Collection::Submissions, id.as_ref())?
                .ok_or_else(|| Error::not_found("submission not found"))?;
            Ok(from_document(&document)?)
        })
    }
}
