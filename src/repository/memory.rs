use bson::{Bson, Document as BsonDocument, oid::ObjectId};
use parking_lot::RwLock;

use super::eval::{Matcher, compare_docs};
use super::store::DocumentStore;
use crate::converter::CompiledQuery;
use crate::errors::CriteriaError;

/// In-process collection of BSON documents keyed by `_id`.
pub struct MemoryStore {
    name: String,
    docs: RwLock<Vec<BsonDocument>>,
    indexes: RwLock<Vec<String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), docs: RwLock::new(Vec::new()), indexes: RwLock::new(Vec::new()) }
    }

    /// Insert a document, assigning an `ObjectId` when `_id` is absent.
    pub fn insert(&self, mut doc: BsonDocument) -> Bson {
        let id = match doc.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                doc.insert("_id", id.clone());
                id
            }
        };
        self.docs.write().push(doc);
        id
    }

    pub fn insert_many<I: IntoIterator<Item = BsonDocument>>(&self, docs: I) -> Vec<Bson> {
        docs.into_iter().map(|d| self.insert(d)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Fields an index was requested for, in request order.
    #[must_use]
    pub fn indexes(&self) -> Vec<String> {
        self.indexes.read().clone()
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, query: &CompiledQuery) -> Result<Vec<BsonDocument>, CriteriaError> {
        let matcher = Matcher::new(&query.predicate)?;
        let mut out = Vec::new();
        for d in self.docs.read().iter() {
            if matcher.matches(d)? {
                out.push(d.clone());
            }
        }
        if !query.sort.is_empty() {
            out.sort_by(|a, b| compare_docs(a, b, &query.sort));
        }
        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = match query.limit {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };
        Ok(out.into_iter().skip(skip).take(limit).collect())
    }

    fn count(&self, predicate: &BsonDocument) -> Result<u64, CriteriaError> {
        let matcher = Matcher::new(predicate)?;
        let mut n = 0u64;
        for d in self.docs.read().iter() {
            if matcher.matches(d)? {
                n += 1;
            }
        }
        Ok(n)
    }

    fn create_index(&self, field: &str) -> Result<(), CriteriaError> {
        let mut idx = self.indexes.write();
        if !idx.iter().any(|f| f == field) {
            idx.push(field.to_owned());
        }
        Ok(())
    }
}
