//! Filter evaluation for in-memory documents.
//!
//! This module evaluates [`Filter`]s against BSON documents the way a
//! document database would: numbers compare by numeric value regardless of
//! their width, and an equality filter on an array field matches when any
//! element is equal.

use bson::{Bson, Document, DateTime, oid::ObjectId};
use std::collections::HashMap;

use docmodel_core::{
    error::{StoreError, StoreResult},
    filter::{Filter, FilterVisitor},
};

/// Comparable representation of BSON values.
///
/// Integers of either width are normalized to `i64` and compared exactly.
/// An integer equals a double only if the double holds exactly that integer.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(&'a str),
    ObjectId(ObjectId),
    DateTime(DateTime),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON value, compared structurally.
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Double(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Double(a), Comparable::Double(b)) => a == b,
            (Comparable::Int(int), Comparable::Double(double))
            | (Comparable::Double(double), Comparable::Int(int)) => {
                int_equals_double(*int, *double)
            }
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

/// Exact comparison: `2^53 + 1` does not equal the double `2^53`.
fn int_equals_double(int: i64, double: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    double.fract() == 0.0
        && double >= i64::MIN as f64
        && double < i64::MAX as f64
        && double as i64 == int
}

/// Returns `true` if a stored field value satisfies an equality match on `expected`.
pub(crate) fn field_matches(stored: &Bson, expected: &Bson) -> bool {
    let (stored, expected) = (Comparable::from(stored), Comparable::from(expected));

    match (&stored, &expected) {
        (Comparable::Array(items), Comparable::Array(_)) => {
            stored == expected || items.iter().any(|item| item == &expected)
        }
        (Comparable::Array(items), _) => items.iter().any(|item| item == &expected),
        _ => stored == expected,
    }
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, filter: &Filter) -> StoreResult<bool> {
        self.visit_filter(filter)
    }

    pub fn matches(document: &Document, filter: &Filter) -> StoreResult<bool> {
        DocumentEvaluator::new(document).evaluate(filter)
    }
}

impl FilterVisitor for DocumentEvaluator<'_> {
    type Output = bool;
    type Error = StoreError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(true)
    }

    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(match self.document.get(field) {
            Some(stored) => field_matches(stored, value),
            // A missing field only matches an explicit null.
            None => matches!(value, Bson::Null),
        })
    }

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        for filter in filters {
            if !self.visit_filter(filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
