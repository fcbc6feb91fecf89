//! The capability trait implemented by concrete entity types.
//!
//! A model type can be default-constructed into an unbound entity, gives
//! access to its [`Entity`] so payloads can be attached, and names the
//! namespace its documents live in. That is everything the builder and the
//! lifecycle layer need to work with any number of concrete types.
//!
//! # Deriving
//!
//! ```ignore
//! use docmodel::prelude::*;
//!
//! #[derive(Debug, Clone, Model)]
//! #[model(database = "polls", collection = "languages")]
//! pub struct Language {
//!     #[entity]
//!     entity: Entity,
//! }
//! ```

use crate::{entity::Entity, error::EntityError, value::Value};

/// Core trait that all entity types must implement.
///
/// `Default` must produce an unbound, empty entity in the namespace named by
/// [`database_name`](Model::database_name) and
/// [`collection_name`](Model::collection_name).
pub trait Model: Default + Send + Sync + 'static {
    /// Returns the name of the database this model is stored in.
    fn database_name() -> &'static str;

    /// Returns the name of the collection this model is stored in.
    fn collection_name() -> &'static str;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;
}

/// Extension trait with shortcuts to the underlying [`Entity`].
///
/// This trait is automatically implemented for all types that implement [`Model`].
pub trait ModelExt: Model {
    /// The identifier as a hex string, if the entity is bound.
    fn identifier(&self) -> Option<String>;

    /// The serialized document.
    fn payload(&self) -> &str;

    /// The parsed document.
    fn document(&self) -> Result<Value, EntityError>;

    /// Binds the entity to the identifier given as a hex string.
    fn set_identifier(&mut self, id: &str) -> Result<(), EntityError>;

    fn set_payload(&mut self, payload: impl Into<String>);
}

impl<M: Model> ModelExt for M {
    fn identifier(&self) -> Option<String> {
        self.entity().identifier()
    }

    fn payload(&self) -> &str {
        self.entity().payload()
    }

    fn document(&self) -> Result<Value, EntityError> {
        self.entity().document()
    }

    fn set_identifier(&mut self, id: &str) -> Result<(), EntityError> {
        self.entity_mut().set_identifier(id)
    }

    fn set_payload(&mut self, payload: impl Into<String>) {
        self.entity_mut().set_payload(payload)
    }
}

impl Entity {
    /// Creates the unbound entity for model type `T`.
    pub fn of<T: Model>() -> Self {
        Entity::new(T::database_name(), T::collection_name())
    }
}
