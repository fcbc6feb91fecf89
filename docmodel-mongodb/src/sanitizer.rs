//! Key sanitization for MongoDB compatibility.
//!
//! MongoDB restricts field names (keys) from containing characters used in
//! its query syntax. Payload keys are arbitrary JSON object keys, so they are
//! escaped on write and restored on read. Values are never touched.

use bson::{Bson, Document};

/// Escapes and restores document keys to handle MongoDB field name restrictions.
///
/// MongoDB does not allow field names to contain:
/// - Dots (`.`) - used for nested field access in queries
/// - Dollar signs (`$`) - used for operators in queries
/// - Null bytes (`\0`) - field name terminators
pub(crate) struct ValueSanitizer;

impl ValueSanitizer {
    /// Character replacements for sanitization
    const REPLACEMENTS: [(&'static str, &'static str); 3] = [
        (".", "__dot__"),
        ("$", "__dollar__"),
        ("\0", "__null__"),
    ];

    /// Recursively escapes every key of `document`, including keys of
    /// nested documents and of documents inside arrays.
    pub(crate) fn sanitize_document(document: Document) -> Document {
        document
            .into_iter()
            .map(|(key, value)| {
                (Self::sanitize_key(&key), Self::map_value(value, Self::sanitize_document))
            })
            .collect()
    }

    /// Inverse of [`sanitize_document`](Self::sanitize_document).
    pub(crate) fn restore_document(document: Document) -> Document {
        document
            .into_iter()
            .map(|(key, value)| {
                (Self::restore_key(&key), Self::map_value(value, Self::restore_document))
            })
            .collect()
    }

    /// Escapes problematic characters in a single key.
    pub(crate) fn sanitize_key(input: &str) -> String {
        let mut sanitized = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter() {
            sanitized = sanitized.replace(*target, *replacement);
        }
        sanitized
    }

    /// Reverts [`sanitize_key`](Self::sanitize_key).
    pub(crate) fn restore_key(input: &str) -> String {
        let mut restored = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter().rev() {
            restored = restored.replace(*replacement, *target);
        }
        restored
    }

    fn map_value(value: Bson, keys: fn(Document) -> Document) -> Bson {
        match value {
            Bson::Document(doc) => Bson::Document(keys(doc)),
            Bson::Array(arr) => Bson::Array(
                arr
                    .into_iter()
                    .map(|item| Self::map_value(item, keys))
                    .collect(),
            ),
            other => other,
        }
    }
}
