use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, doc};
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions},
};
use tracing::debug;

use docmodel_core::{
    backend::{Namespace, StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    filter::Filter,
};

use crate::{query::MongoFilterTranslator, sanitizer::ValueSanitizer};

/// Server error code reported when a unique index rejects a write.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Maps a driver error, reporting unique index rejections as [`StoreError::DuplicateKey`].
fn map_error(err: MongoError) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            Some(write.message.as_str())
        }
        ErrorKind::Command(command) if command.code == DUPLICATE_KEY_CODE => {
            Some(command.message.as_str())
        }
        _ => None,
    };

    match duplicate {
        Some(message) => StoreError::DuplicateKey(duplicate_index_name(message)),
        None => StoreError::Backend(err.to_string()),
    }
}

/// Extracts the index name from a duplicate key message such as
/// `E11000 duplicate key error collection: polls.languages index: tag dup key: { tag: "en" }`.
///
/// Indexes are named after their field, so the name is the field.
fn duplicate_index_name(message: &str) -> String {
    message
        .split_once("index: ")
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(ValueSanitizer::restore_key)
        .unwrap_or_else(|| message.to_string())
}

/// MongoDB document storage backend.
///
/// Each [`Namespace`] maps to the database and collection of the same names.
/// Payload keys are escaped on write and restored on read, see
/// [`sanitizer`](crate::sanitizer).
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
}

impl MongoDbStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn builder(dsn: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn)
    }

    fn get_collection(&self, ns: &Namespace) -> MongoCollection<Document> {
        self.client
            .database(ns.database())
            .collection(ns.collection())
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn find_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(
            self.get_collection(ns)
                .find_one(MongoFilterTranslator::translate(filter)?)
                .await
                .map_err(map_error)?
                .map(ValueSanitizer::restore_document)
        )
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        self.get_collection(ns)
            .count_documents(MongoFilterTranslator::translate(filter)?)
            .await
            .map_err(map_error)
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> StoreResult<()> {
        let result = self.get_collection(ns)
            .replace_one(
                MongoFilterTranslator::translate(filter)?,
                ValueSanitizer::sanitize_document(document),
            )
            .upsert(upsert)
            .await
            .map_err(map_error)?;

        debug!(
            namespace = %ns,
            matched = result.matched_count,
            upserted = result.upserted_id.is_some(),
            "document replaced"
        );

        Ok(())
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        Ok(
            self.get_collection(ns)
                .delete_one(MongoFilterTranslator::translate(filter)?)
                .await
                .map_err(map_error)?
                .deleted_count
        )
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        // The server reads a limit of 0 as "no limit".
        if limit == 0 {
            return Ok(vec![]);
        }

        Ok(
            self.get_collection(ns)
                .find(MongoFilterTranslator::translate(filter)?)
                .skip(skip)
                .limit(i64::try_from(limit).unwrap_or(i64::MAX))
                .await
                .map_err(map_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(map_error)?
                .into_iter()
                .map(ValueSanitizer::restore_document)
                .collect()
        )
    }

    /// Unique indexes are sparse: documents without the field are not indexed,
    /// matching the builder, which skips unique keys absent from its input.
    async fn add_index(&self, ns: &Namespace, field: &str, unique: bool) -> StoreResult<()> {
        self.get_collection(ns)
            .create_index(
                IndexModel::builder()
                .keys(doc! { ValueSanitizer::sanitize_key(field): 1 })
                .options(
                    IndexOptions::builder()
                    .name(ValueSanitizer::sanitize_key(field))
                    .unique(unique)
                    .sparse(unique)
                    .build()
                )
                .build()
            )
            .await
            .map_err(map_error)?;

        debug!(namespace = %ns, field, unique, "index created");
        Ok(())
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder for [`MongoDbStore`], carrying the connection string and client options.
pub struct MongoDbStoreBuilder {
    dsn: String,
    app_name: Option<String>,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            app_name: None,
        }
    }

    /// Sets the application name reported to the server.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let mut options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        if self.app_name.is_some() {
            options.app_name = self.app_name;
        }

        Ok(MongoDbStore::new(
            Client::with_options(options)
                .map_err(|e| StoreError::Initialization(e.to_string()))?,
        ))
    }
}
