//! Store-assigned document identifiers.

use bson::{Bson, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::EntityError;

/// A 24 hexadecimal character ObjectId handle.
///
/// An `Identifier` always holds a syntactically valid handle. Entities that
/// were never saved simply have no identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(ObjectId);

impl Identifier {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parses a 24 character hexadecimal string.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::InvalidIdentifier`] for any other input.
    pub fn parse(input: &str) -> Result<Self, EntityError> {
        ObjectId::parse_str(input)
            .map(Self)
            .map_err(|_| EntityError::InvalidIdentifier(input.to_string()))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl FromStr for Identifier {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl From<ObjectId> for Identifier {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<Identifier> for Bson {
    fn from(id: Identifier) -> Self {
        Bson::ObjectId(id.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}
