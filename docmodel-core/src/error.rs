//! Error types for building, validating and persisting documents.
//!
//! Each layer has its own error enum:
//!
//! - [`StoreError`] for failures reported by a [`StoreBackend`](crate::backend::StoreBackend)
//! - [`ValidationError`] for input rejected by a schema or a unique constraint
//! - [`BuildError`] for [`DocumentBuilder`](crate::builder::DocumentBuilder) runs
//! - [`EntityError`] for entity lifecycle operations
//!
//! Use [`StoreResult<T>`] as the return type of backend operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all errors a storage backend may report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The document has an invalid structure for the requested operation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A write was rejected by a unique index on the given field.
    #[error("Duplicate key for unique field {0}")]
    DuplicateKey(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Input rejected by a schema or a unique constraint.
///
/// Only the first violation is reported. Properties are checked in schema
/// declaration order and unique keys in sorted order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The top-level input is not an object.
    #[error("JSON data must be an object")]
    NotAnObject,
    /// A required property is absent.
    #[error("Missing property: {0}")]
    MissingProperty(String),
    /// A property is present with a kind other than the declared one.
    #[error("Type mismatch for key '{0}'")]
    TypeMismatch(String),
    /// A unique property's value already exists in the target collection.
    #[error("Unique constraint violation for key: {0}")]
    UniqueConstraintViolation(String),
}

impl ValidationError {
    /// Returns the offending property name, if the error is tied to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::MissingProperty(key)
            | ValidationError::TypeMismatch(key)
            | ValidationError::UniqueConstraintViolation(key) => Some(key),
        }
    }
}

/// Errors produced by a document builder run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// The input failed validation or a uniqueness check.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The uniqueness count query could not be executed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors produced by entity lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    /// The identifier is not a 24 character hexadecimal string.
    #[error("invalid ObjectId: {0}")]
    InvalidIdentifier(String),
    /// The operation requires an identifier but the entity has none.
    #[error("entity has no identifier")]
    Unbound,
    /// No stored document matches.
    #[error("document not found")]
    NotFound,
    /// `save` was called with an empty payload.
    #[error("empty (null) document")]
    EmptyDocument,
    /// The payload is not a JSON object.
    #[error("bad document data: {0}")]
    InvalidPayload(String),
    /// The store rejected the write because of a unique index.
    #[error("Unique constraint violation for key: {0}")]
    UniqueConstraintViolation(String),
    /// The store round trip failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EntityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(field) => EntityError::UniqueConstraintViolation(field),
            other => EntityError::Store(other),
        }
    }
}
