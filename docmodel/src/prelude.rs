//! Convenient re-exports of commonly used types from docmodel.
//!
//! ```ignore
//! use docmodel::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Model` trait, its derive macro and the `Entity` state
//! - Schemas, values and the document builder
//! - Store backends, builders and the lifecycle collection
//! - Error types

pub use docmodel_core::{
    backend::{Namespace, StoreBackend, StoreBackendBuilder},
    builder::DocumentBuilder,
    collection::ModelCollection,
    entity::Entity,
    error::{BuildError, EntityError, StoreError, StoreResult, ValidationError},
    filter::Filter,
    identifier::Identifier,
    model::{Model, ModelExt},
    page::ListOptions,
    schema::{Property, Schema},
    store::DocumentStore,
    value::{Value, ValueKind},
};

pub use docmodel_macros::Model;
