//! In-memory storage implementation.
//!
//! Documents are kept per namespace in insertion order, which is the
//! store's natural order for listings. Unique indexes are enforced on every
//! write.

use std::{collections::{BTreeSet, HashMap}, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};
use tracing::debug;

use docmodel_core::{
    backend::{Namespace, StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    filter::{Filter, ID_FIELD},
};

use crate::evaluator::{DocumentEvaluator, field_matches};

/// Documents and unique indexes of a single namespace.
#[derive(Debug, Default, Clone)]
struct CollectionState {
    documents: Vec<Document>,
    unique: BTreeSet<String>,
}

impl CollectionState {
    fn position(&self, filter: &Filter) -> StoreResult<Option<usize>> {
        for (index, document) in self.documents.iter().enumerate() {
            if DocumentEvaluator::matches(document, filter)? {
                return Ok(Some(index));
            }
        }

        Ok(None)
    }

    fn matching(&self, filter: &Filter) -> StoreResult<Vec<&Document>> {
        let mut documents = Vec::new();

        for document in &self.documents {
            if DocumentEvaluator::matches(document, filter)? {
                documents.push(document);
            }
        }

        Ok(documents)
    }

    /// Fails if `document` would collide with another document on a unique field.
    fn check_unique(&self, document: &Document, skip: Option<usize>) -> StoreResult<()> {
        for field in &self.unique {
            let Some(value) = document.get(field) else {
                continue;
            };

            let collides = self
                .documents
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .filter_map(|(_, other)| other.get(field))
                .any(|other| field_matches(other, value) || field_matches(value, other));

            if collides {
                return Err(StoreError::DuplicateKey(field.clone()));
            }
        }

        Ok(())
    }
}

type StoreMap = HashMap<Namespace, CollectionState>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data.
///
/// # Performance
///
/// Every operation scans the namespace's documents; there are no lookup
/// indexes. Use a persistent backend like MongoDB for large datasets.
///
/// # Unique indexes
///
/// A unique index only constrains documents that carry the indexed field,
/// like the sparse unique indexes the MongoDB backend creates. Two documents
/// without the field never collide; two explicit `null`s do.
///
/// # Example
///
/// ```ignore
/// use docmodel_memory::InMemoryStore;
/// use docmodel::backend::{Namespace, StoreBackend};
/// use docmodel::filter::Filter;
///
/// let store = InMemoryStore::new();
/// let ns = Namespace::new("polls", "languages");
/// assert_eq!(store.count(&ns, &Filter::All).await?, 0);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// namespace -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn find_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<Option<Document>> {
        let store = self.store.read().await;
        let Some(collection) = store.get(ns) else {
            return Ok(None);
        };

        Ok(
            collection
                .position(filter)?
                .map(|index| collection.documents[index].clone())
        )
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        let store = self.store.read().await;
        let Some(collection) = store.get(ns) else {
            return Ok(0);
        };

        Ok(collection.matching(filter)?.len() as u64)
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        mut document: Document,
        upsert: bool,
    ) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let collection = store.entry(ns.clone()).or_default();

        match collection.position(filter)? {
            Some(index) => {
                let existing_id = collection.documents[index]
                    .get(ID_FIELD)
                    .cloned()
                    .unwrap_or(Bson::Null);

                match document.get(ID_FIELD) {
                    Some(id) if id != &existing_id => {
                        return Err(StoreError::InvalidDocument(format!(
                            "replacement would change {ID_FIELD} of a stored document"
                        )));
                    }
                    Some(_) => {}
                    None => {
                        document.insert(ID_FIELD, existing_id);
                    }
                }

                collection.check_unique(&document, Some(index))?;
                collection.documents[index] = document;

                debug!(namespace = %ns, "document replaced");
            }
            None if upsert => {
                if !document.contains_key(ID_FIELD) {
                    let id = match filter {
                        Filter::Eq { field, value } if field == ID_FIELD => value.clone(),
                        _ => Bson::ObjectId(ObjectId::new()),
                    };
                    document.insert(ID_FIELD, id);
                }

                collection.check_unique(&document, None)?;
                collection.documents.push(document);

                debug!(namespace = %ns, "document inserted");
            }
            None => {}
        }

        Ok(())
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection) = store.get_mut(ns) else {
            return Ok(0);
        };

        match collection.position(filter)? {
            Some(index) => {
                collection.documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(collection) = store.get(ns) else {
            return Ok(vec![]);
        };

        Ok(
            collection
                .matching(filter)?
                .into_iter()
                .skip(usize::try_from(skip).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect()
        )
    }

    async fn add_index(&self, ns: &Namespace, field: &str, unique: bool) -> StoreResult<()> {
        if !unique {
            // Lookups always scan, so plain indexes change nothing here.
            return Ok(());
        }

        let mut store = self.store.write().await;
        let collection = store.entry(ns.clone()).or_default();

        let mut candidate = collection.clone();
        candidate.unique = BTreeSet::from([field.to_string()]);
        for (index, document) in collection.documents.iter().enumerate() {
            candidate.check_unique(document, Some(index))?;
        }

        collection.unique.insert(field.to_string());
        debug!(namespace = %ns, field, "unique index added");

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn ns() -> Namespace {
        Namespace::new("polls", "languages")
    }

    /// Upserts `document` under a fresh identifier.
    async fn insert(store: &InMemoryStore, document: Document) -> StoreResult<ObjectId> {
        let id = ObjectId::new();
        store.replace_one(&ns(), &Filter::eq(ID_FIELD, id), document, true).await?;
        Ok(id)
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let store = InMemoryStore::new();
        let id = ObjectId::new();
        let filter = Filter::eq(ID_FIELD, id);

        store.replace_one(&ns(), &filter, doc! { "tag": "en" }, true).await.unwrap();
        store.replace_one(&ns(), &filter, doc! { "name": "English" }, true).await.unwrap();

        assert_eq!(store.count(&ns(), &Filter::All).await.unwrap(), 1);
        assert_eq!(
            store.find_one(&ns(), &filter).await.unwrap(),
            Some(doc! { "name": "English", "_id": id })
        );
    }

    #[tokio::test]
    async fn replace_without_upsert_is_a_no_op() {
        let store = InMemoryStore::new();
        let filter = Filter::eq("tag", "en");

        store.replace_one(&ns(), &filter, doc! { "tag": "en" }, false).await.unwrap();
        assert_eq!(store.count(&ns(), &Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn replace_cannot_change_identifier() {
        let store = InMemoryStore::new();
        insert(&store, doc! { "tag": "en" }).await.unwrap();

        let result = store
            .replace_one(&ns(), &Filter::eq("tag", "en"), doc! { "_id": ObjectId::new() }, true)
            .await;

        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let store = InMemoryStore::new();
        let other = Namespace::new("polls", "campaigns");
        insert(&store, doc! { "tag": "en" }).await.unwrap();

        assert_eq!(store.count(&other, &Filter::eq("tag", "en")).await.unwrap(), 0);
        assert_eq!(store.find(&other, &Filter::All, 0, 10).await.unwrap(), vec![]);
        assert_eq!(store.delete_one(&other, &Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_first_match_only() {
        let store = InMemoryStore::new();
        for _ in 0..2 {
            insert(&store, doc! { "tag": "en" }).await.unwrap();
        }

        assert_eq!(store.delete_one(&ns(), &Filter::eq("tag", "en")).await.unwrap(), 1);
        assert_eq!(store.count(&ns(), &Filter::All).await.unwrap(), 1);
        assert_eq!(store.delete_one(&ns(), &Filter::eq("tag", "fr")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_keeps_insertion_order() {
        let store = InMemoryStore::new();
        for n in 0..5_i64 {
            insert(&store, doc! { "n": n }).await.unwrap();
        }

        let page = store.find(&ns(), &Filter::All, 1, 3).await.unwrap();
        let seen = page.iter().map(|doc| doc.get_i64("n").unwrap()).collect::<Vec<_>>();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let store = InMemoryStore::new();
        store.add_index(&ns(), "tag", true).await.unwrap();

        let first = insert(&store, doc! { "tag": "en" }).await.unwrap();

        assert_eq!(
            insert(&store, doc! { "tag": "en" }).await,
            Err(StoreError::DuplicateKey("tag".into()))
        );

        // Rewriting the same document keeps its own value.
        let filter = Filter::eq(ID_FIELD, first);
        let document = doc! { "tag": "en", "rtl": false };
        store.replace_one(&ns(), &filter, document, true).await.unwrap();
        assert_eq!(store.count(&ns(), &Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unique_index_keeps_large_integers_apart() {
        let store = InMemoryStore::new();
        store.add_index(&ns(), "code", true).await.unwrap();

        insert(&store, doc! { "code": 9_007_199_254_740_993_i64 }).await.unwrap();

        let neighbour = Filter::eq("code", 9_007_199_254_740_992_i64);
        assert_eq!(store.count(&ns(), &neighbour).await.unwrap(), 0);
        assert!(store.find_one(&ns(), &neighbour).await.unwrap().is_none());
        insert(&store, doc! { "code": 9_007_199_254_740_992_i64 }).await.unwrap();
    }

    #[tokio::test]
    async fn unique_index_ignores_documents_without_the_field() {
        let store = InMemoryStore::new();
        store.add_index(&ns(), "tag", true).await.unwrap();

        insert(&store, doc! { "name": "English" }).await.unwrap();
        insert(&store, doc! { "name": "French" }).await.unwrap();

        insert(&store, doc! { "tag": Bson::Null }).await.unwrap();
        assert_eq!(
            insert(&store, doc! { "tag": Bson::Null }).await,
            Err(StoreError::DuplicateKey("tag".into()))
        );
    }

    #[tokio::test]
    async fn unique_index_requires_unique_existing_values() {
        let store = InMemoryStore::new();
        for _ in 0..2 {
            insert(&store, doc! { "tag": "en" }).await.unwrap();
        }

        assert_eq!(
            store.add_index(&ns(), "tag", true).await,
            Err(StoreError::DuplicateKey("tag".into()))
        );
        store.add_index(&ns(), "tag", false).await.unwrap();
    }
}
