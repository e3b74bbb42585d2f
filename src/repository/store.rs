use bson::Document as BsonDocument;

use crate::converter::CompiledQuery;
use crate::errors::CriteriaError;

/// A document collection that can execute compiled queries.
pub trait DocumentStore: Send + Sync {
    fn name(&self) -> &str;

    /// `find(predicate).sort(sort).skip(skip).limit(limit)`; `limit == 0` is unbounded.
    fn find(&self, query: &CompiledQuery) -> Result<Vec<BsonDocument>, CriteriaError>;

    fn count(&self, predicate: &BsonDocument) -> Result<u64, CriteriaError>;

    fn create_index(&self, field: &str) -> Result<(), CriteriaError>;
}
