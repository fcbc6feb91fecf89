//! Entity lifecycle operations for one model type.
//!
//! A [`ModelCollection`] binds a model type to an injected backend and
//! implements fetch, save, remove, get-by-id and paginated listing. Every
//! operation is a single round trip to the store and owns no state across
//! calls; each entity instance carries its own identifier and payload.
//!
//! # Example
//!
//! ```ignore
//! use docmodel::prelude::*;
//! use serde_json::json;
//!
//! let languages = store.models::<Language>();
//!
//! let mut language = languages.build(&json!({ "tag": "en" }), &schema).await?;
//! languages.save(&mut language).await?;
//!
//! let same = languages.get(&language.identifier().unwrap()).await?;
//! let first_page = languages.list(ListOptions::default()).await?;
//! ```

use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::{
    backend::{Namespace, StoreBackend},
    builder::DocumentBuilder,
    error::{BuildError, EntityError, StoreResult},
    filter::{Filter, ID_FIELD},
    identifier::Identifier,
    model::Model,
    page::ListOptions,
    schema::Schema,
    value::Value,
};

/// Lifecycle manager for entities of type `T` stored through backend `B`.
#[derive(Debug)]
pub struct ModelCollection<'a, B: StoreBackend, T: Model> {
    namespace: Namespace,
    backend: &'a B,
    _marker: PhantomData<T>,
}

impl<'a, B: StoreBackend, T: Model> ModelCollection<'a, B, T> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self { namespace: Namespace::of::<T>(), backend, _marker: PhantomData }
    }

    /// Returns the namespace new entities of this type are stored in.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Builds an unsaved entity from JSON input, see [`DocumentBuilder::build`].
    pub async fn build(&self, input: &serde_json::Value, schema: &Schema) -> Result<T, BuildError> {
        DocumentBuilder::new(schema)
            .build(input, self.backend)
            .await
    }

    /// Reloads the entity's payload from the store.
    ///
    /// # Errors
    ///
    /// - [`EntityError::Unbound`] if the entity has no identifier
    /// - [`EntityError::NotFound`] if nothing is stored under it
    ///
    /// The entity is unchanged on failure.
    pub async fn fetch(&self, model: &mut T) -> Result<(), EntityError> {
        let entity = model.entity_mut();
        let id = entity.id().ok_or(EntityError::Unbound)?;

        let mut document = self
            .backend
            .find_one(entity.namespace(), &Filter::by_id(id))
            .await?
            .ok_or(EntityError::NotFound)?;

        document.remove(ID_FIELD);
        entity.set_document(&Value::from(&document));

        debug!(namespace = %entity.namespace(), %id, "entity fetched");
        Ok(())
    }

    /// Writes the entity's payload to the store as a full-document upsert.
    ///
    /// An unbound entity gets a freshly generated identifier, which is only
    /// kept once the write succeeded.
    ///
    /// # Errors
    ///
    /// - [`EntityError::EmptyDocument`] if no payload is set
    /// - [`EntityError::InvalidPayload`] if the payload is not a JSON object
    /// - [`EntityError::UniqueConstraintViolation`] if a store unique index rejects the write
    ///
    /// The entity is unchanged on failure.
    pub async fn save(&self, model: &mut T) -> Result<(), EntityError> {
        let entity = model.entity_mut();
        let id = entity.id().unwrap_or_else(Identifier::generate);
        let document = entity.to_store_document(id)?;

        self.backend
            .replace_one(entity.namespace(), &Filter::by_id(id), document, true)
            .await
            .inspect_err(|err| {
                warn!(namespace = %entity.namespace(), %id, error = %err, "save rejected")
            })?;

        entity.set_id(id);

        debug!(namespace = %entity.namespace(), %id, "entity saved");
        Ok(())
    }

    /// Deletes the entity from the store and resets it to the unbound,
    /// empty state, whether or not a stored document was deleted.
    ///
    /// # Errors
    ///
    /// - [`EntityError::Unbound`] if the entity has no identifier
    ///
    /// A store failure is propagated and leaves the entity unchanged.
    pub async fn remove(&self, model: &mut T) -> Result<(), EntityError> {
        let entity = model.entity_mut();
        let id = entity.id().ok_or(EntityError::Unbound)?;

        let deleted = self
            .backend
            .delete_one(entity.namespace(), &Filter::by_id(id))
            .await?;

        debug!(namespace = %entity.namespace(), %id, deleted, "entity removed");
        entity.reset();

        Ok(())
    }

    /// Loads the entity stored under the hex identifier `id`.
    ///
    /// # Errors
    ///
    /// - [`EntityError::InvalidIdentifier`] if `id` is malformed
    /// - [`EntityError::NotFound`] if nothing is stored under it
    pub async fn get(&self, id: &str) -> Result<T, EntityError> {
        let mut model = T::default();

        model.entity_mut().set_identifier(id)?;
        self.fetch(&mut model).await?;

        Ok(model)
    }

    /// Loads the first entity matching `filter`.
    ///
    /// # Errors
    ///
    /// - [`EntityError::NotFound`] if nothing matches
    pub async fn find_one(&self, filter: &Filter) -> Result<T, EntityError> {
        let document = self
            .backend
            .find_one(&self.namespace, filter)
            .await?
            .ok_or(EntityError::NotFound)?;

        let mut model = T::default();
        if !model.entity_mut().load(document) {
            return Err(EntityError::InvalidPayload("stored document has no ObjectId".into()));
        }

        Ok(model)
    }

    /// Lists stored entities in the store's natural order.
    ///
    /// Returns at most `options.limit` entities, each bound to its stored
    /// identifier. Stored documents without an ObjectId identifier are
    /// skipped.
    pub async fn list(&self, options: ListOptions) -> Result<Vec<T>, EntityError> {
        let documents = self
            .backend
            .find(&self.namespace, &Filter::All, options.skip, options.limit)
            .await?;

        let mut models = Vec::with_capacity(documents.len());

        for document in documents {
            let mut model = T::default();

            if model.entity_mut().load(document) {
                models.push(model);
            } else {
                warn!(namespace = %self.namespace, "skipping stored document without ObjectId");
            }
        }

        debug!(
            namespace = %self.namespace,
            skip = options.skip,
            limit = options.limit,
            found = models.len(),
            "entities listed"
        );
        Ok(models)
    }

    /// Counts stored entities matching `filter`.
    pub async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        self.backend
            .count(&self.namespace, filter)
            .await
    }
}
