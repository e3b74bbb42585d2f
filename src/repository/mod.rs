//! Executes compiled criteria against a [`DocumentStore`] and assembles pages.

mod eval;
mod index;
mod memory;
mod store;

use bson::Document as BsonDocument;
use serde::Serialize;
use std::sync::Arc;

use crate::converter::Converter;
use crate::criteria::Criteria;
use crate::errors::CriteriaError;

pub use eval::{Matcher, compare_bson, compare_docs, matches};
pub use index::IndexRegistry;
pub use memory::MemoryStore;
pub use store::DocumentStore;

/// One page of results plus the metadata callers need to paginate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            next_page: self.next_page,
        }
    }
}

/// `page + 1` when `page * limit < total`; `None` without both page and limit.
#[must_use]
pub fn next_page(page: Option<u64>, limit: Option<u64>, total: u64) -> Option<u64> {
    match (page, limit) {
        (Some(p), Some(l)) if p.saturating_mul(l) < total => Some(p.saturating_add(1)),
        _ => None,
    }
}

pub struct CriteriaRepository<S: DocumentStore> {
    store: S,
    converter: Converter,
    registry: Arc<IndexRegistry>,
    index_fields: Vec<String>,
}

impl<S: DocumentStore> CriteriaRepository<S> {
    pub fn new(store: S, converter: Converter) -> Self {
        Self { store, converter, registry: Arc::new(IndexRegistry::new()), index_fields: Vec::new() }
    }

    /// Share a registry so several repositories create a collection's indexes once.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<IndexRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_indexes<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.index_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Create the configured indexes the first time this collection is used.
    pub fn ensure_indexes(&self) -> Result<bool, CriteriaError> {
        self.registry.ensure_once(self.store.name(), || {
            for field in &self.index_fields {
                self.store.create_index(field)?;
                log::info!("created index on {}.{field}", self.store.name());
            }
            Ok(())
        })
    }

    /// Run `criteria` and return one page. The native identifier is removed
    /// from every returned document.
    pub fn search(&self, criteria: &Criteria) -> Result<Page<BsonDocument>, CriteriaError> {
        self.ensure_indexes()?;
        let query = self.converter.convert(criteria)?;
        let native = self.converter.config().native_identifier_field.as_str();
        let items = self
            .store
            .find(&query)?
            .into_iter()
            .map(|mut d| {
                d.remove(native);
                d
            })
            .collect();
        let total = self.store.count(&query.predicate)?;
        Ok(Page {
            items,
            total,
            current_page: criteria.current_page(),
            next_page: next_page(criteria.current_page(), criteria.limit(), total),
        })
    }

    pub fn count(&self, criteria: &Criteria) -> Result<u64, CriteriaError> {
        let predicate = self.converter.predicate(criteria.filters())?;
        self.store.count(&predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_rules() {
        assert_eq!(next_page(Some(1), Some(10), 25), Some(2));
        assert_eq!(next_page(Some(3), Some(10), 25), None);
        assert_eq!(next_page(Some(2), Some(10), 20), None);
        assert_eq!(next_page(None, Some(10), 25), None);
        assert_eq!(next_page(Some(1), None, 25), None);
    }

    #[test]
    fn page_map_keeps_metadata() {
        let p = Page { items: vec![1, 2], total: 7, current_page: Some(1), next_page: Some(2) };
        let q = p.map(|x| x * 10);
        assert_eq!(q.items, vec![10, 20]);
        assert_eq!(q.total, 7);
        assert_eq!(q.next_page, Some(2));
    }
}
