//! Filter translation from docmodel filters to MongoDB query syntax.

use bson::{Bson, Document, doc};

use docmodel_core::{
    error::StoreError,
    filter::{Filter, FilterVisitor},
};

use crate::sanitizer::ValueSanitizer;

/// Translates docmodel filters into MongoDB query documents.
///
/// Field names are sanitized the same way stored keys are, so a filter on a
/// key containing `.` or `$` addresses the escaped stored field.
pub(crate) struct MongoFilterTranslator;

impl MongoFilterTranslator {
    pub(crate) fn translate(filter: &Filter) -> Result<Document, StoreError> {
        MongoFilterTranslator.visit_filter(filter)
    }
}

impl FilterVisitor for MongoFilterTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(doc! {})
    }

    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            ValueSanitizer::sanitize_key(field): { "$eq": value },
        })
    }

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        if filters.is_empty() {
            return self.visit_all();
        }

        Ok(doc! {
            "$and": filters
                .iter()
                .map(|filter| self.visit_filter(filter))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
