//! Compiles a [`Criteria`] into a BSON query: predicate, sort, skip and limit.
//!
//! Conversion is a pure single pass over the filters. With the default
//! [`LastWriteWins`](crate::config::MergePolicy::LastWriteWins) policy,
//! fragments are shallow-merged in filter order, so two filters on the same
//! field (or two OR filters, which both produce `$or`) keep only the last
//! one. Use [`Conjunction`](crate::config::MergePolicy::Conjunction) to keep
//! all of them under `$and`.

mod predicate;
mod sort;

use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};

use crate::config::ConverterConfig;
use crate::criteria::{Criteria, Filters};
use crate::errors::CriteriaError;
use crate::utils::trace::{self, ConvertEvent};

pub use predicate::{BETWEEN_SHAPE, IN_SHAPE, OR_SHAPE};

/// Backend query produced by the converter. `limit == 0` means unbounded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub predicate: BsonDocument,
    pub sort: BsonDocument,
    pub skip: u64,
    pub limit: u64,
}

impl CompiledQuery {
    /// Relaxed extended JSON view, for printing and logs.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "predicate": bson::Bson::Document(self.predicate.clone()).into_relaxed_extjson(),
            "sort": bson::Bson::Document(self.sort.clone()).into_relaxed_extjson(),
            "skip": self.skip,
            "limit": self.limit,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    #[must_use]
    pub const fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// # Errors
    /// Fails when a filter's operator and value shape disagree (BETWEEN without a
    /// range, OR without conditions, IN without a list) or an OR branch uses a
    /// composite operator.
    pub fn convert(&self, criteria: &Criteria) -> Result<CompiledQuery, CriteriaError> {
        let (predicate, overwritten) = if criteria.has_filters() {
            self.merged(criteria.filters())?
        } else {
            (BsonDocument::new(), Vec::new())
        };
        let sort = sort::sort_spec(criteria.order(), &self.config);
        let query = CompiledQuery {
            predicate,
            sort,
            skip: criteria.offset().unwrap_or(0),
            limit: criteria.limit().unwrap_or(0),
        };
        log::debug!(
            "compiled {} filter(s): predicate={} sort={} skip={} limit={}",
            criteria.filters().len(),
            query.predicate,
            query.sort,
            query.skip,
            query.limit
        );
        trace::record(ConvertEvent {
            filters: criteria.filters().len(),
            predicate_keys: query.predicate.len(),
            merge: self.config.merge_policy,
            overwritten,
            skip: query.skip,
            limit: query.limit,
        });
        Ok(query)
    }

    /// Predicate document for a filter sequence; empty when there are no filters.
    pub fn predicate(&self, filters: &Filters) -> Result<BsonDocument, CriteriaError> {
        Ok(self.merged(filters)?.0)
    }

    fn merged(&self, filters: &Filters) -> Result<(BsonDocument, Vec<String>), CriteriaError> {
        let fragments = filters
            .iter()
            .map(|f| predicate::fragment(f, self.config.scalar_encoding))
            .collect::<Result<Vec<_>, _>>()?;
        if fragments.is_empty() {
            return Ok((BsonDocument::new(), Vec::new()));
        }
        Ok(predicate::merge(fragments, self.config.merge_policy))
    }
}

/// Convert with the default configuration.
pub fn convert(criteria: &Criteria) -> Result<CompiledQuery, CriteriaError> {
    Converter::default().convert(criteria)
}
