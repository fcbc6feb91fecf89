//! Filters passed to store backends.
//!
//! The lifecycle layer only ever needs to match everything, match a single
//! field by equality, or combine such matches. Backends translate a
//! [`Filter`] into their native form by implementing [`FilterVisitor`].
//!
//! ```ignore
//! use docmodel::filter::Filter;
//!
//! let filter = Filter::eq("tag", "en").and(Filter::eq("rtl", false));
//! ```

use bson::Bson;

use crate::{error::StoreError, identifier::Identifier};

/// Name of the field holding a stored document's identifier.
pub const ID_FIELD: &str = "_id";

/// A filter expression selecting stored documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    /// Matches documents whose field equals the value.
    Eq {
        field: String,
        value: Bson,
    },
    /// Matches documents matching every inner filter.
    And(Vec<Filter>),
}

impl Filter {
    pub fn all() -> Self {
        Filter::All
    }

    /// Creates an equality filter on a single field.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Eq { field: field.into(), value: value.into() }
    }

    /// Matches the document stored under `id`.
    pub fn by_id(id: Identifier) -> Self {
        Filter::eq(ID_FIELD, id)
    }

    /// Combines this filter with another using logical AND.
    ///
    /// If this filter is already an AND, the other filter is appended to it.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::All => other,
            Filter::And(mut list) => {
                list.push(other);
                Filter::And(list)
            }
            _ => Filter::And(vec![self, other]),
        }
    }
}

/// Translates or evaluates a [`Filter`].
pub trait FilterVisitor {
    type Output;
    type Error: Into<StoreError>;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error>;
    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error>;
    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error>;

    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        match filter {
            Filter::All => self.visit_all(),
            Filter::Eq { field, value } => self.visit_eq(field, value),
            Filter::And(filters) => self.visit_and(filters),
        }
    }
}
