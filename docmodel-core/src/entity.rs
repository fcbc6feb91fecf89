//! Entity state: namespace, identifier and serialized payload.
//!
//! An [`Entity`] is either *unbound* (no identifier, never saved or just
//! removed) or *bound* (identifier set). The payload is the serialized JSON
//! text of the entity's document. It is populated by a
//! [`DocumentBuilder`](crate::builder::DocumentBuilder) run before the first
//! save, or by a fetch from the store, or directly by the caller. Whatever
//! payload is set when saving is what gets written.

use bson::Document;

use crate::{
    backend::Namespace,
    error::EntityError,
    filter::ID_FIELD,
    identifier::Identifier,
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    namespace: Namespace,
    id: Option<Identifier>,
    payload: String,
}

impl Entity {
    /// Creates an unbound, empty entity stored in `database.collection`.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::in_namespace(Namespace::new(database, collection))
    }

    pub fn in_namespace(namespace: Namespace) -> Self {
        Self { namespace, id: None, payload: String::new() }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn id(&self) -> Option<Identifier> {
        self.id
    }

    /// The identifier as a hex string, if bound.
    pub fn identifier(&self) -> Option<String> {
        self.id.map(|id| id.to_hex())
    }

    pub fn is_bound(&self) -> bool {
        self.id.is_some()
    }

    /// Binds the entity to the identifier given as a hex string.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::InvalidIdentifier`] if `id` is not 24 hex
    /// characters. The entity is left unchanged in that case.
    pub fn set_identifier(&mut self, id: &str) -> Result<(), EntityError> {
        self.id = Some(Identifier::parse(id)?);
        Ok(())
    }

    pub fn set_id(&mut self, id: Identifier) {
        self.id = Some(id);
    }

    /// The serialized document, empty if none is set.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    /// Replaces the payload with raw JSON text. The text is not checked until
    /// the entity is saved.
    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
    }

    /// Replaces the payload with the serialized form of `document`.
    pub fn set_document(&mut self, document: &Value) {
        self.payload = document.to_json().to_string();
    }

    /// Parses the payload.
    ///
    /// # Errors
    ///
    /// - [`EntityError::EmptyDocument`] if no payload is set
    /// - [`EntityError::InvalidPayload`] if the payload is not a JSON object
    pub fn document(&self) -> Result<Value, EntityError> {
        if self.payload.is_empty() {
            return Err(EntityError::EmptyDocument);
        }

        let json = serde_json::from_str::<serde_json::Value>(&self.payload)
            .map_err(|err| EntityError::InvalidPayload(err.to_string()))?;

        match Value::from(json) {
            value @ Value::Object(_) => Ok(value),
            other => Err(EntityError::InvalidPayload(format!(
                "expected an object, found {}",
                other.kind()
            ))),
        }
    }

    /// Returns the entity to its freshly constructed state.
    pub fn reset(&mut self) {
        self.id = None;
        self.payload.clear();
    }

    /// Builds the document written to the store for identifier `id`.
    ///
    /// Any `_id` member of the payload is replaced by `id`.
    pub(crate) fn to_store_document(&self, id: Identifier) -> Result<Document, EntityError> {
        let mut document = match self.document()?.to_bson() {
            bson::Bson::Document(document) => document,
            _ => return Err(EntityError::InvalidPayload("expected an object".into())),
        };

        document.remove(ID_FIELD);

        let mut stored = Document::new();
        stored.insert(ID_FIELD, id);
        for (key, value) in document {
            stored.insert(key, value);
        }

        Ok(stored)
    }

    /// Loads a document read from the store, splitting off its identifier.
    ///
    /// Returns `false` and leaves the entity unchanged if the document carries
    /// no ObjectId identifier.
    pub(crate) fn load(&mut self, mut stored: Document) -> bool {
        let id = match stored.remove(ID_FIELD) {
            Some(bson::Bson::ObjectId(oid)) => Identifier::from(oid),
            _ => return false,
        };

        self.id = Some(id);
        self.set_document(&Value::from(&stored));

        true
    }
}
