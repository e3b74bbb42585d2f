use bson::{Bson, Document as BsonDocument};

use super::operator::Operator;
use super::value::FilterValue;
use crate::errors::CriteriaError;
use crate::utils::json::{json_object_to_document, natural_string};
use crate::value_objects::FieldName;

/// Pull `field`/`operator`/`value` out of a loosely-typed map. A present
/// `value` may be falsy (`0`, `""`, `false`, `null`); absence and BSON
/// `undefined` fail.
pub(crate) fn parse_triple(
    raw: &BsonDocument,
) -> Result<(FieldName, Operator, FilterValue), CriteriaError> {
    let value = raw.get("value").filter(|v| !matches!(v, Bson::Undefined));
    let (Some(field), Some(operator), Some(value)) = (raw.get("field"), raw.get("operator"), value)
    else {
        return Err(CriteriaError::invalid("The filter is invalid"));
    };
    let operator = match operator {
        Bson::String(token) => token.parse::<Operator>()?,
        other => {
            return Err(CriteriaError::invalid(format!(
                "The filter operator {} is invalid",
                natural_string(other)
            )));
        }
    };
    Ok((FieldName::from_bson(field)?, operator, FilterValue::from_bson(value.clone())?))
}

/// One field/operator/value condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: FieldName,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Filter {
    #[must_use]
    pub const fn new(field: FieldName, operator: Operator, value: FilterValue) -> Self {
        Self { field, operator, value }
    }

    /// Build from a map carrying `field`, `operator` and `value`.
    pub fn from_values(raw: &BsonDocument) -> Result<Self, CriteriaError> {
        let (field, operator, value) = parse_triple(raw)?;
        Ok(Self { field, operator, value })
    }

    pub fn from_json(raw: &serde_json::Value) -> Result<Self, CriteriaError> {
        Self::from_values(&json_object_to_document(raw)?)
    }

    /// Shorthand for typed callers: `Filter::of("age", Operator::Gt, 18)`.
    pub fn of(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Bson>,
    ) -> Result<Self, CriteriaError> {
        Ok(Self::new(FieldName::new(field)?, operator, FilterValue::from_bson(value)?))
    }
}

/// Ordered collection of filters. Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<Filter>);

impl Filters {
    #[must_use]
    pub const fn new(filters: Vec<Filter>) -> Self {
        Self(filters)
    }

    #[must_use]
    pub const fn none() -> Self {
        Self(Vec::new())
    }

    pub fn from_values(raw: &[BsonDocument]) -> Result<Self, CriteriaError> {
        raw.iter().map(Filter::from_values).collect::<Result<Vec<_>, _>>().map(Self)
    }

    pub fn from_json(raw: &[serde_json::Value]) -> Result<Self, CriteriaError> {
        raw.iter().map(Filter::from_json).collect::<Result<Vec<_>, _>>().map(Self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Filter] {
        &self.0
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Self(filters)
    }
}

impl FromIterator<Filter> for Filters {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Filters {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Filters {
    type Item = Filter;
    type IntoIter = std::vec::IntoIter<Filter>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
