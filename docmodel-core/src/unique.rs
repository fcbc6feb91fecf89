//! Application-level uniqueness checks.
//!
//! The count-then-write sequence is not atomic: two builds racing on the
//! same value can both pass. Stores should also carry a unique index on the
//! same fields, see
//! [`DocumentStore::ensure_indexes`](crate::store::DocumentStore::ensure_indexes).

use std::collections::BTreeSet;
use tracing::debug;

use crate::{
    backend::{Namespace, StoreBackend},
    error::{BuildError, ValidationError},
    filter::Filter,
    value::Value,
};

/// Fails if any unique key present in `input` already has its value stored in `ns`.
///
/// Keys are checked in sorted order, one count query each; keys absent from
/// `input` are skipped. The first collision stops the check.
///
/// # Errors
///
/// - [`ValidationError::UniqueConstraintViolation`] naming the colliding key
/// - [`BuildError::Store`] if a count query fails
pub async fn check_unique<B: StoreBackend>(
    input: &Value,
    unique_keys: &BTreeSet<String>,
    backend: &B,
    ns: &Namespace,
) -> Result<(), BuildError> {
    for key in unique_keys {
        let Some(value) = input.get(key) else {
            continue;
        };

        let existing = backend
            .count(ns, &Filter::eq(key.as_str(), value))
            .await?;

        debug!(namespace = %ns, key = %key, existing, "unique constraint checked");

        if existing > 0 {
            return Err(ValidationError::UniqueConstraintViolation(key.clone()).into());
        }
    }

    Ok(())
}
