//! Schema-validated JSON documents bound to a document store.
//!
//! This crate is the core of the docmodel project and provides:
//!
//! - **Value model** ([`value`]) - A closed value tree and total conversions from JSON and BSON
//! - **Schemas** ([`schema`]) - Expected properties, kinds and unique constraints per entity type
//! - **Validation** ([`validate`], [`unique`]) - Strict schema projection and uniqueness checks
//! - **Document builder** ([`builder`]) - Turns untrusted input into unsaved entities
//! - **Entities** ([`entity`], [`model`], [`identifier`]) - Entity state and the model capability trait
//! - **Lifecycle** ([`collection`], [`store`]) - Fetch, save, remove, get and list against a backend
//! - **Store backend abstraction** ([`backend`], [`filter`]) - The five operations a store must provide
//! - **Error handling** ([`error`]) - Error types per layer
//! - **Paging** ([`page`]) - Offset/limit list options
//!
//! # Example
//!
//! ```ignore
//! use docmodel::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, Model)]
//! #[model(database = "polls", collection = "languages")]
//! pub struct Language {
//!     #[entity]
//!     entity: Entity,
//! }
//!
//! let schema = Schema::builder()
//!     .property("tag", ValueKind::String, true)
//!     .property("name", ValueKind::String, true)
//!     .unique("tag")
//!     .build();
//!
//! let languages = store.models::<Language>();
//! let mut language = languages.build(&json!({ "tag": "en", "name": "English" }), &schema).await?;
//! languages.save(&mut language).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_core;

pub mod backend;
pub mod builder;
pub mod collection;
pub mod entity;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod model;
pub mod page;
pub mod schema;
pub mod store;
pub mod unique;
pub mod validate;
pub mod value;

#[cfg(test)]
mod testing;
