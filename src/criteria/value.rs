use bson::{Bson, Document as BsonDocument, doc};

use super::filter::parse_triple;
use super::operator::Operator;
use crate::errors::CriteriaError;
use crate::utils::json::{json_to_bson, natural_string, to_json_string};
use crate::value_objects::FieldName;

/// Accepted spellings of a BETWEEN range, in lookup order.
pub(crate) const BOUND_KEYS: [(&str, &str); 3] =
    [("start", "end"), ("startDate", "endDate"), ("from", "to")];

const TRIPLE_KEYS: [&str; 3] = ["field", "operator", "value"];

/// Inclusive range bounds, normalised from any accepted spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Bson,
    pub end: Bson,
}

/// A filter leaf nested inside an OR filter's value.
#[derive(Debug, Clone, PartialEq)]
pub struct OrCondition {
    pub field: FieldName,
    pub operator: Operator,
    pub value: FilterValue,
}

impl OrCondition {
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Bson>,
    ) -> Result<Self, CriteriaError> {
        Ok(Self { field: FieldName::new(field)?, operator, value: FilterValue::from_bson(value.into())? })
    }

    pub fn from_document(raw: &BsonDocument) -> Result<Self, CriteriaError> {
        let (field, operator, value) = parse_triple(raw)?;
        Ok(Self { field, operator, value })
    }

    fn to_document(&self) -> BsonDocument {
        doc! {
            "field": self.field.as_str(),
            "operator": self.operator.token(),
            "value": self.value.raw().clone(),
        }
    }
}

/// Shape classification of a filter value. Exactly one holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(Bson),
    PrimitiveList(Vec<Bson>),
    OrConditions(Vec<OrCondition>),
    Range(Range),
}

/// A filter's comparison value: the structured shape plus its canonical
/// string form and the original raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue {
    canonical: String,
    raw: Bson,
    shape: Shape,
}

fn is_triple(val: &Bson) -> bool {
    matches!(val, Bson::Document(d) if TRIPLE_KEYS.iter().all(|k| d.contains_key(k)))
}

fn range_of(d: &BsonDocument) -> Option<Range> {
    BOUND_KEYS.iter().find_map(|(s, e)| match (d.get(s), d.get(e)) {
        (Some(start), Some(end)) => Some(Range { start: start.clone(), end: end.clone() }),
        _ => None,
    })
}

impl FilterValue {
    /// Classify a raw value into exactly one shape.
    pub fn from_bson(raw: impl Into<Bson>) -> Result<Self, CriteriaError> {
        let raw = raw.into();
        let (canonical, shape) = match &raw {
            Bson::Array(items) if items.first().is_some_and(is_triple) => {
                let conditions = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Bson::Document(d) if is_triple(item) => OrCondition::from_document(d),
                        _ => Err(CriteriaError::invalid(format!("The OR condition at index {i} is invalid"))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (to_json_string(&raw), Shape::OrConditions(conditions))
            }
            Bson::Array(items) => {
                let joined = items.iter().map(natural_string).collect::<Vec<_>>().join(",");
                (joined, Shape::PrimitiveList(items.clone()))
            }
            Bson::Document(d) => match range_of(d) {
                Some(range) => (to_json_string(&raw), Shape::Range(range)),
                None => (natural_string(&raw), Shape::Scalar(raw.clone())),
            },
            other => (natural_string(other), Shape::Scalar(other.clone())),
        };
        Ok(Self { canonical, raw, shape })
    }

    pub fn from_json(raw: serde_json::Value) -> Result<Self, CriteriaError> {
        Self::from_bson(json_to_bson(raw)?)
    }

    pub fn scalar(value: impl Into<Bson>) -> Result<Self, CriteriaError> {
        Self::from_bson(value)
    }

    pub fn range(start: impl Into<Bson>, end: impl Into<Bson>) -> Result<Self, CriteriaError> {
        Self::from_bson(doc! { "start": start.into(), "end": end.into() })
    }

    pub fn list<I, V>(values: I) -> Result<Self, CriteriaError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        Self::from_bson(Bson::Array(values.into_iter().map(Into::into).collect()))
    }

    pub fn or_conditions(conditions: Vec<OrCondition>) -> Result<Self, CriteriaError> {
        if conditions.is_empty() {
            return Err(CriteriaError::invalid("OR requires at least one condition"));
        }
        let raw = Bson::Array(conditions.iter().map(|c| Bson::Document(c.to_document())).collect());
        Ok(Self { canonical: to_json_string(&raw), raw, shape: Shape::OrConditions(conditions) })
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The value as it was supplied.
    #[must_use]
    pub const fn raw(&self) -> &Bson {
        &self.raw
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn is_or_conditions(&self) -> bool {
        matches!(self.shape, Shape::OrConditions(_))
    }

    #[must_use]
    pub const fn is_between(&self) -> bool {
        matches!(self.shape, Shape::Range(_))
    }

    #[must_use]
    pub const fn is_primitive_array(&self) -> bool {
        matches!(self.shape, Shape::PrimitiveList(_))
    }

    pub fn as_or_conditions(&self) -> Result<&[OrCondition], CriteriaError> {
        match &self.shape {
            Shape::OrConditions(c) => Ok(c),
            _ => Err(self.mismatch("an OR condition list")),
        }
    }

    pub fn as_between(&self) -> Result<&Range, CriteriaError> {
        match &self.shape {
            Shape::Range(r) => Ok(r),
            _ => Err(self.mismatch("a BETWEEN range")),
        }
    }

    pub fn as_primitive_array(&self) -> Result<&[Bson], CriteriaError> {
        match &self.shape {
            Shape::PrimitiveList(v) => Ok(v),
            _ => Err(self.mismatch("a primitive array")),
        }
    }

    fn mismatch(&self, expected: &str) -> CriteriaError {
        CriteriaError::TypeMismatch(format!("value {} is not {expected}", self.canonical))
    }
}
