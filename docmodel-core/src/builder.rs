//! Builds unsaved entities from untrusted JSON input.
//!
//! A build converts the input into a [`Value`], validates it against a
//! [`Schema`], checks the schema's unique keys against the target
//! collection, and attaches the canonical document to a fresh, unbound
//! entity. Each step short-circuits on failure; a failed build yields no
//! entity. The builder never writes: persisting the result is up to the
//! caller, see [`ModelCollection::save`](crate::collection::ModelCollection::save).
//!
//! # Example
//!
//! ```ignore
//! use docmodel::prelude::*;
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .property("tag", ValueKind::String, true)
//!     .unique("tag")
//!     .build();
//!
//! let mut language: Language = DocumentBuilder::new(&schema)
//!     .build(&json!({ "tag": "en", "ignored": 1 }), &backend)
//!     .await?;
//! ```

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{
    backend::{Namespace, StoreBackend},
    error::{BuildError, ValidationError},
    model::Model,
    schema::Schema,
    unique::check_unique,
    validate::validate,
    value::Value,
};

/// Builds entities of any [`Model`] type against a borrowed [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'s> {
    schema: &'s Schema,
}

impl<'s> DocumentBuilder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Builds an unbound `T` from parsed JSON input.
    ///
    /// Unique keys are checked against the raw input in `T`'s namespace.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotAnObject`], [`ValidationError::MissingProperty`],
    ///   [`ValidationError::TypeMismatch`] from validation
    /// - [`ValidationError::UniqueConstraintViolation`] if a unique value is taken
    /// - [`BuildError::Store`] if a uniqueness count query fails
    pub async fn build<T, B>(&self, input: &serde_json::Value, backend: &B) -> Result<T, BuildError>
    where
        T: Model,
        B: StoreBackend,
    {
        self.build_value(&Value::from(input), backend).await
    }

    /// Builds an unbound `T` from raw JSON text.
    ///
    /// Text that does not parse as JSON is rejected as
    /// [`ValidationError::NotAnObject`].
    pub async fn build_str<T, B>(&self, input: &str, backend: &B) -> Result<T, BuildError>
    where
        T: Model,
        B: StoreBackend,
    {
        let value = serde_json::from_str::<serde_json::Value>(input)
            .map(Value::from)
            .unwrap_or_default();

        self.build_value(&value, backend).await
    }

    /// Builds an unbound `T` from an already converted value.
    pub async fn build_value<T, B>(&self, input: &Value, backend: &B) -> Result<T, BuildError>
    where
        T: Model,
        B: StoreBackend,
    {
        let ns = Namespace::of::<T>();

        match self.run(input, backend, &ns).await {
            Ok(document) => {
                let mut model = T::default();
                model.entity_mut().set_document(&document);

                debug!(namespace = %ns, "document built");
                Ok(model)
            }
            Err(err) => {
                warn!(namespace = %ns, error = %err, "document rejected");
                Err(err)
            }
        }
    }

    async fn run<B: StoreBackend>(
        &self,
        input: &Value,
        backend: &B,
        ns: &Namespace,
    ) -> Result<Value, BuildError> {
        if !input.is_object() {
            return Err(ValidationError::NotAnObject.into());
        }

        let fields = validate(input, self.schema)?;
        check_unique(input, self.schema.unique_keys(), backend, ns).await?;

        Ok(Value::Object(fields.into_iter().collect::<BTreeMap<_, _>>()))
    }
}
