//! Storage backend abstraction.
//!
//! The [`StoreBackend`] trait is the entire surface the builder and the
//! entity lifecycle depend on: point lookup, filtered count, filtered
//! replace and delete, and skip/limit listing. Any document store exposing
//! these operations is a valid backend. Unique indexes are optional; a
//! backend that cannot enforce them may treat [`StoreBackend::add_index`]
//! as a no-op.
//!
//! Documents cross this boundary as [`bson::Document`]s. Stored documents
//! carry their identifier under [`ID_FIELD`](crate::filter::ID_FIELD).
//!
//! # Examples
//!
//! ```ignore
//! use docmodel::backend::{Namespace, StoreBackend};
//! use docmodel::filter::Filter;
//!
//! let ns = Namespace::new("polls", "languages");
//! let existing = backend.count(&ns, &Filter::eq("tag", "en")).await?;
//! ```

use async_trait::async_trait;
use bson::Document;
use std::fmt::{self, Debug};

use crate::{error::StoreResult, filter::Filter, model::Model};

/// A (database, collection) pair addressing stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self { database: database.into(), collection: collection.into() }
    }

    /// The namespace a model type is stored in.
    pub fn of<T: Model>() -> Self {
        Self::new(T::database_name(), T::collection_name())
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Abstract interface for document storage backends.
///
/// Every method performs a single round trip to the store. Implementations
/// must be thread-safe; how they synchronize internally is up to them.
///
/// # Error Handling
///
/// Operations return [`StoreResult<T>`](crate::error::StoreResult). A write
/// rejected by a unique index must be reported as
/// [`StoreError::DuplicateKey`](crate::error::StoreError::DuplicateKey)
/// naming the indexed field.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Returns the first document matching `filter`, if any.
    async fn find_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Counts the documents matching `filter`.
    async fn count(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64>;

    /// Replaces the first document matching `filter` with `document`.
    ///
    /// The replacement is a full document, not a patch. When nothing matches
    /// and `upsert` is set, `document` is inserted; when nothing matches and
    /// `upsert` is not set, nothing happens.
    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> StoreResult<()>;

    /// Deletes the first document matching `filter`.
    ///
    /// Returns the number of deleted documents (0 or 1). Deleting nothing is
    /// not an error.
    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64>;

    /// Lists documents matching `filter` in the store's natural order,
    /// skipping `skip` documents and returning at most `limit`.
    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>>;

    /// Creates an index on `field`, enforcing uniqueness when `unique` is set.
    async fn add_index(&self, ns: &Namespace, field: &str, unique: bool) -> StoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn find_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<Option<Document>> {
        (*self).find_one(ns, filter).await
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        (*self).count(ns, filter).await
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> StoreResult<()> {
        (*self)
            .replace_one(ns, filter, document, upsert)
            .await
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        (*self).delete_one(ns, filter).await
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        (*self)
            .find(ns, filter, skip, limit)
            .await
    }

    async fn add_index(&self, ns: &Namespace, field: &str, unique: bool) -> StoreResult<()> {
        (*self)
            .add_index(ns, field, unique)
            .await
    }
}

/// Factory trait for creating backend instances.
///
/// Builders carry backend configuration (connection strings, client
/// options) and are consumed by [`build`](StoreBackendBuilder::build).
#[async_trait]
pub trait StoreBackendBuilder: Send {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
