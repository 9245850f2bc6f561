//! User identity records over the storage engine.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::{
    DisplayName, EmailAddress, Error, NewUser, User, UserId, UserRepository,
};

use super::{Collection, StorageEngine, from_document, to_document};

/// [`UserRepository`] backed by the `users` collection.
///
/// Email uniqueness is enforced by a full collection scan inside the
/// write transaction that inserts the record. The engine admits one
/// writer at a time, so two concurrent registrations of the same address
/// serialise and exactly one succeeds.
pub struct RedbUserRepository {
    engine: Arc<StorageEngine>,
    clock: Arc<dyn Clock>,
}

impl RedbUserRepository {
    /// Create the repository over an opened engine.
    pub fn new(engine: Arc<StorageEngine>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }
}

#[async_trait]
impl UserRepository for RedbUserRepository {
    async fn create(&self, candidate: NewUser) -> Result<User, Error> {
        let created = self.clock.utc();
        self.engine.write(|view| {
            for (_, document) in view.scan(Collection::Users)? {
                let existing: User = from_document(&document)?;
                if existing.email() == &candidate.email {
                    return Err(Error::conflict("email already registered"));
                }
            }

            let user = User::new(
                candidate.id.unwrap_or_else(UserId::random),
                candidate.email,
                candidate.password,
                candidate.name,
                candidate.picture,
                candidate.is_admin,
                created,
            );
            view.put(Collection::Users, user.id().as_ref(), &to_document(&user)?)?;
            Ok(user)
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, Error> {
        self.engine.read(|view| {
            let document = view
                .get(Collection::Users, id.as_ref())?
                .ok_or_else(|| Error::not_found("user not found"))?;
            Ok(from_document(&document)?)
        })
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.engine.read(|view| {
            for (_, document) in view.scan(Collection::Users)? {
                let user: User = from_document(&document)?;
                if user.email() == email {
                    return Ok(user);
                }
            }
            Err(Error::not_found("user not found"))
        })
    }

    async fn update_profile(
        &self,
        id: &UserId,
        name: DisplayName,
        picture: Option<String>,
    ) -> Result<User, Error> {
        self.engine.write(|view| {
            let document = view
                .get(Collection::Users, id.as_ref())?
                .ok_or_else(|| Error::not_found("user not found"))?;
            let stored: User = from_document(&document)?;

            let updated = stored.with_profile(name, picture);
            view.put(
                Collection::Users,
                updated.id().as_ref(),
                &to_document(&updated)?,
            )?;
            Ok(updated)
        })
    }

    async fn list_all(&self) -> Result<Vec<User>, Error> {
        self.engine.read(|view| {
            view.scan(Collection::Users)?
                .iter()
                .map(|(_, document)| Ok(from_document(document)?))
                .collect()
        })
    }
}
