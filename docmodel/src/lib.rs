//! Main docmodel crate providing a unified interface for schema-validated documents.
//!
//! This crate is the primary entry point for users of docmodel. It re-exports
//! the core types and functionality from the sub-crates, the `Model` derive
//! macro and the available storage backends.
//!
//! # Features
//!
//! - **Schema validation** - Untrusted JSON is projected onto a declared set of typed properties
//! - **Uniqueness checks** - Unique keys are checked against the store before an entity is built
//! - **Entity lifecycle** - Fetch, save, remove, get and list entities by identifier
//! - **Multiple backends** - In-memory and MongoDB storage behind one backend trait
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, Model)]
//! #[model(database = "polls", collection = "languages")]
//! pub struct Language {
//!     #[entity]
//!     entity: Entity,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!
//!     let schema = Schema::builder()
//!         .property("tag", ValueKind::String, true)
//!         .property("name", ValueKind::String, true)
//!         .unique("tag")
//!         .build();
//!     store.ensure_indexes::<Language>(&schema).await?;
//!
//!     let languages = store.models::<Language>();
//!
//!     // Validate untrusted input and persist it
//!     let mut language = languages
//!         .build(&json!({ "tag": "en", "name": "English", "extra": true }), &schema)
//!         .await?;
//!     languages.save(&mut language).await?;
//!
//!     // Load it back by identifier
//!     let id = language.identifier().unwrap_or_default();
//!     let loaded = languages.get(&id).await?;
//!     println!("Loaded language: {}", loaded.payload());
//!
//!     // Remove it again
//!     let mut loaded = loaded;
//!     languages.remove(&mut loaded).await?;
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - `mongodb` - Persistent MongoDB backend (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docmodel;

pub mod prelude;

pub use docmodel_core::{
    backend, builder, collection, entity, error, filter, identifier, model, page, schema, store,
    unique, validate, value,
};

/// Derive macro implementing [`model::Model`] and `Default`.
pub use docmodel_macros::Model;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docmodel_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docmodel_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
