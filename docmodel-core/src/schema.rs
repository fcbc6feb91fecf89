//! Per-type schemas: expected properties and unique constraints.
//!
//! A [`Schema`] is declared once per entity type and only borrowed by
//! [`DocumentBuilder`](crate::builder::DocumentBuilder) runs, so a single
//! schema can be shared by any number of concurrent builds.
//!
//! # Example
//!
//! ```ignore
//! use docmodel::schema::Schema;
//! use docmodel::value::ValueKind;
//!
//! let schema = Schema::builder()
//!     .property("tag", ValueKind::String, true)
//!     .property("name", ValueKind::String, true)
//!     .property("rtl", ValueKind::Bool, false)
//!     .unique("tag")
//!     .build();
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::value::ValueKind;

/// Declaration of a single schema property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub required: bool,
}

/// Expected properties of a document, in declaration order, and the set of
/// properties whose values must be unique within a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    unique: BTreeSet<String>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for fluent declaration.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declares a property.
    ///
    /// Redeclaring a name replaces its kind and requiredness but keeps its
    /// original position.
    pub fn declare_property(&mut self, name: impl Into<String>, kind: ValueKind, required: bool) {
        let name = name.into();

        match self.properties.iter_mut().find(|prop| prop.name == name) {
            Some(prop) => {
                prop.kind = kind;
                prop.required = required;
            }
            None => self.properties.push(Property { name, kind, required }),
        }
    }

    /// Marks a property name as unique-constrained.
    ///
    /// The name does not have to be a declared property: uniqueness is checked
    /// against the raw input.
    pub fn declare_unique(&mut self, name: impl Into<String>) {
        self.unique.insert(name.into());
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|prop| prop.name == name)
    }

    /// Unique-constrained names in sorted order.
    pub fn unique_keys(&self) -> &BTreeSet<String> {
        &self.unique
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn property(mut self, name: impl Into<String>, kind: ValueKind, required: bool) -> Self {
        self.schema.declare_property(name, kind, required);
        self
    }

    pub fn unique(mut self, name: impl Into<String>) -> Self {
        self.schema.declare_unique(name);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_declaration_order() {
        let schema = Schema::builder()
            .property("zeta", ValueKind::String, true)
            .property("alpha", ValueKind::Int64, false)
            .build();

        let names = schema.properties().iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn redeclaring_replaces_in_place() {
        let mut schema = Schema::new();
        schema.declare_property("a", ValueKind::String, true);
        schema.declare_property("b", ValueKind::Bool, false);
        schema.declare_property("a", ValueKind::Double, false);

        assert_eq!(schema.properties().len(), 2);
        assert_eq!(
            schema.property("a"),
            Some(&Property { name: "a".into(), kind: ValueKind::Double, required: false })
        );
        assert_eq!(schema.properties()[0].name, "a");
    }

    #[test]
    fn unique_keys_are_sorted() {
        let schema = Schema::builder().unique("tag").unique("code").unique("tag").build();
        assert_eq!(
            schema.unique_keys().iter().cloned().collect::<Vec<_>>(),
            vec!["code".to_string(), "tag".to_string()]
        );
    }

    #[test]
    fn deserializes_from_configuration() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "properties": [
                    { "name": "tag", "kind": "string", "required": true },
                    { "name": "rtl", "kind": "bool" }
                ],
                "unique": ["tag"]
            }"#,
        )
        .unwrap();

        assert_eq!(
            schema,
            Schema::builder()
                .property("tag", ValueKind::String, true)
                .property("rtl", ValueKind::Bool, false)
                .unique("tag")
                .build()
        );
    }
}
