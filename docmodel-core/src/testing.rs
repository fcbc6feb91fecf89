//! In-crate test double for [`StoreBackend`].

use async_trait::async_trait;
use bson::{Bson, Document};
use std::sync::Mutex;

use crate::{
    backend::{Namespace, StoreBackend},
    entity::Entity,
    error::{StoreError, StoreResult},
    filter::{Filter, FilterVisitor, ID_FIELD},
    model::Model,
};

/// Keeps documents in a vector, in insertion order, and records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub documents: Mutex<Vec<(Namespace, Document)>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_with: Mutex<Option<StoreError>>,
}

struct Matcher<'a>(&'a Document);

impl FilterVisitor for Matcher<'_> {
    type Output = bool;
    type Error = StoreError;

    fn visit_all(&mut self) -> StoreResult<bool> {
        Ok(true)
    }

    fn visit_eq(&mut self, field: &str, value: &Bson) -> StoreResult<bool> {
        Ok(self.0.get(field) == Some(value))
    }

    fn visit_and(&mut self, filters: &[Filter]) -> StoreResult<bool> {
        for filter in filters {
            if !self.visit_filter(filter)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl RecordingBackend {
    pub fn with_documents(ns: &Namespace, documents: Vec<Document>) -> Self {
        let backend = Self::default();
        backend
            .documents
            .lock()
            .unwrap()
            .extend(documents.into_iter().map(|doc| (ns.clone(), doc)));
        backend
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> StoreResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn matching(&self, ns: &Namespace, filter: &Filter) -> Vec<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(doc_ns, doc)| doc_ns == ns && Matcher(doc).visit_filter(filter).unwrap())
            .map(|(_, doc)| doc.clone())
            .collect()
    }
}

#[async_trait]
impl StoreBackend for RecordingBackend {
    async fn find_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<Option<Document>> {
        self.record(format!("find_one {ns}"))?;
        Ok(self.matching(ns, filter).into_iter().next())
    }

    async fn count(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        let field = match filter {
            Filter::Eq { field, .. } => field.as_str(),
            _ => "*",
        };
        self.record(format!("count {ns} {field}"))?;
        Ok(self.matching(ns, filter).len() as u64)
    }

    async fn replace_one(
        &self,
        ns: &Namespace,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> StoreResult<()> {
        self.record(format!("replace_one {ns} upsert={upsert}"))?;

        let mut documents = self.documents.lock().unwrap();
        let position = documents
            .iter()
            .position(|(doc_ns, doc)| doc_ns == ns && Matcher(doc).visit_filter(filter).unwrap());

        match position {
            Some(index) => documents[index].1 = document,
            None if upsert => documents.push((ns.clone(), document)),
            None => {}
        }
        Ok(())
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Filter) -> StoreResult<u64> {
        self.record(format!("delete_one {ns}"))?;

        let mut documents = self.documents.lock().unwrap();
        let position = documents
            .iter()
            .position(|(doc_ns, doc)| doc_ns == ns && Matcher(doc).visit_filter(filter).unwrap());

        Ok(match position {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        })
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        self.record(format!("find {ns} skip={skip} limit={limit}"))?;
        Ok(self
            .matching(ns, filter)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn add_index(&self, ns: &Namespace, field: &str, unique: bool) -> StoreResult<()> {
        self.record(format!("add_index {ns} {field} unique={unique}"))
    }
}

/// A model stored in `polls.languages`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Language {
    pub entity: Entity,
}

impl Default for Language {
    fn default() -> Self {
        Self { entity: Entity::of::<Self>() }
    }
}

impl Model for Language {
    fn database_name() -> &'static str {
        "polls"
    }

    fn collection_name() -> &'static str {
        "languages"
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

pub(crate) fn languages() -> Namespace {
    Namespace::of::<Language>()
}

pub(crate) fn stored(id: crate::identifier::Identifier, fields: Document) -> Document {
    let mut doc = Document::new();
    doc.insert(ID_FIELD, id);
    for (key, value) in fields {
        doc.insert(key, value);
    }
    doc
}
