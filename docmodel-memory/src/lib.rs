//! In-memory document storage backend for docmodel.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is ideal for development,
//! testing, and small-scale deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Natural order** - Listings return documents in insertion order
//! - **Unique indexes** - Writes that would duplicate a uniquely indexed value are rejected
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel::{prelude::*, memory::InMemoryStore};
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
//!     let mut language = Language::default();
//!     language.set_payload(r#"{"tag": "en"}"#);
//!     store.models::<Language>().save(&mut language).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_memory;

pub mod store;
mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
