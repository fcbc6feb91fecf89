//! Main document store interface.
//!
//! A [`DocumentStore`] owns a backend handle and hands out
//! [`ModelCollection`]s for model types. The backend is injected at
//! construction; nothing in this crate opens connections on its own.
//!
//! # Example
//!
//! ```ignore
//! use docmodel::prelude::*;
//! use docmodel::memory::InMemoryStore;
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//! store.ensure_indexes::<Language>(&schema).await?;
//!
//! let languages = store.models::<Language>();
//! ```

use tracing::debug;

use crate::{
    backend::{Namespace, StoreBackend},
    collection::ModelCollection,
    error::StoreResult,
    model::Model,
    schema::Schema,
};

/// A document store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets the lifecycle manager for model type `T`.
    pub fn models<T: Model>(&self) -> ModelCollection<'_, B, T> {
        ModelCollection::new(&self.backend)
    }

    /// Creates a unique index in `T`'s namespace for every unique key of `schema`.
    ///
    /// This backs the builder's uniqueness pre-check: two builds racing on the
    /// same value both pass the pre-check, but only one of their saves is
    /// accepted by the index.
    pub async fn ensure_indexes<T: Model>(&self, schema: &Schema) -> StoreResult<()> {
        let ns = Namespace::of::<T>();

        for key in schema.unique_keys() {
            self.backend
                .add_index(&ns, key, true)
                .await?;

            debug!(namespace = %ns, field = %key, "unique index ensured");
        }

        Ok(())
    }

    /// Shuts down the store and its backend.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}
