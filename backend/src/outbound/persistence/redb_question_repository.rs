//! Question definitions over the storage engine.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Error, Question, QuestionDraft, QuestionId, QuestionRepository};

use super::{Collection, StorageEngine, from_document, to_document};

/// [`QuestionRepository`] backed by the `questions` collection.
pub struct RedbQuestionRepository {
    engine: Arc<StorageEngine>,
}

impl RedbQuestionRepository {
    /// Create the repository over an opened engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl QuestionRepository for RedbQuestionRepository {
    async fn create(&self, draft: QuestionDraft) -> Result<Question, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let id = draft.id.clone().unwrap_or_else(QuestionId::random);
        let question = Question::from_draft(id, draft);
        self.engine.write(|view| {
            view.put(
                Collection::Questions,
                question.id().as_ref(),
                &to_document(&question)?,
            )?;
            Ok::<_, Error>(())
        })?;
        Ok(question)
    }

    async fn update(&self, id: &QuestionId, draft: QuestionDraft) -> Result<Question, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        // The stored identifier wins; any id in the draft is ignored.
        let question = Question::from_draft(id.clone(), draft);
        self.engine.write(|view| {
            if view.get(Collection::Questions, id.as_ref())?.is_none() {
                return Err(Error::not_found("question not found"));
            }
            view.put(
                Collection::Questions,
                id.as_ref(),
                &to_document(&question)?,
            )?;
            Ok(())
        })?;
        Ok(question)
    }

    async fn delete(&self, id: &QuestionId) -> Result<(), Error> {
        self.engine.write(|view| {
            if view.get(Collection::Questions, id.as_ref())?.is_none() {
                return Err(Error::not_found("question not found"));
            }
            view.delete(Collection::Questions, id.as_ref())?;
            Ok(())
        })
    }

    async fn list_all(&self) -> Result<Vec<Question>, Error> {
        self.engine.read(|view| {
            view.scan(Collection::Questions)?
                .iter()
                .map(|(_, document)| Ok(from_document(document)?))
                .collect()
        })
    }
}
