use bson::{Bson, Document as BsonDocument, doc};

use crate::config::{MergePolicy, ScalarEncoding};
use crate::criteria::{Filter, FilterValue, Operator, Shape};
use crate::errors::CriteriaError;

pub const BETWEEN_SHAPE: &str = "BETWEEN operator requires an object with start and end values";
pub const OR_SHAPE: &str = "OR operator requires an array of OrCondition objects";
pub const IN_SHAPE: &str = "IN operator requires an array of values";

pub(super) fn keyed(field: &str, value: impl Into<Bson>) -> BsonDocument {
    let mut d = BsonDocument::new();
    d.insert(field, value);
    d
}

fn scalar(value: &FilterValue, encoding: ScalarEncoding) -> Bson {
    match (encoding, value.shape()) {
        (ScalarEncoding::Typed, Shape::Scalar(raw)) => raw.clone(),
        _ => Bson::String(value.as_str().to_owned()),
    }
}

/// Condition document for the simple operators, `None` for composite ones.
fn simple_condition(op: Operator, value: &FilterValue, encoding: ScalarEncoding) -> Option<BsonDocument> {
    let pattern = || Bson::String(value.as_str().to_owned());
    Some(match op {
        Operator::Equal => doc! { "$eq": scalar(value, encoding) },
        Operator::NotEqual => doc! { "$ne": scalar(value, encoding) },
        Operator::Gt => doc! { "$gt": scalar(value, encoding) },
        Operator::Gte => doc! { "$gte": scalar(value, encoding) },
        Operator::Lt => doc! { "$lt": scalar(value, encoding) },
        Operator::Lte => doc! { "$lte": scalar(value, encoding) },
        Operator::Contains => doc! { "$regex": pattern() },
        Operator::NotContains => doc! { "$not": { "$regex": pattern() } },
        Operator::Between | Operator::Or | Operator::In | Operator::NotIn => return None,
    })
}

/// Predicate fragment for one filter.
pub(super) fn fragment(filter: &Filter, encoding: ScalarEncoding) -> Result<BsonDocument, CriteriaError> {
    let field = filter.field.as_str();
    let value = &filter.value;
    match filter.operator {
        Operator::Between => {
            let range = value.as_between().map_err(|_| CriteriaError::InvalidShape(BETWEEN_SHAPE.into()))?;
            Ok(keyed(field, doc! { "$gte": range.start.clone(), "$lte": range.end.clone() }))
        }
        Operator::Or => {
            let conditions =
                value.as_or_conditions().map_err(|_| CriteriaError::InvalidShape(OR_SHAPE.into()))?;
            let branches = conditions
                .iter()
                .map(|c| {
                    simple_condition(c.operator, &c.value, encoding)
                        .map(|cond| Bson::Document(keyed(c.field.as_str(), cond)))
                        .ok_or_else(|| CriteriaError::UnsupportedOrOperator(c.operator.token().into()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(doc! { "$or": branches })
        }
        Operator::In | Operator::NotIn => {
            let items =
                value.as_primitive_array().map_err(|_| CriteriaError::InvalidShape(IN_SHAPE.into()))?;
            let key = if filter.operator == Operator::In { "$in" } else { "$nin" };
            Ok(keyed(field, keyed(key, items.to_vec())))
        }
        op => simple_condition(op, value, encoding)
            .map(|cond| keyed(field, cond))
            .ok_or_else(|| CriteriaError::Internal(format!("no predicate handler for operator {op}"))),
    }
}

/// Combine fragments into one predicate document. Also returns the top-level
/// keys a later fragment replaced, in replacement order.
pub(super) fn merge(fragments: Vec<BsonDocument>, policy: MergePolicy) -> (BsonDocument, Vec<String>) {
    match policy {
        MergePolicy::LastWriteWins => {
            let mut out = BsonDocument::new();
            let mut overwritten = Vec::new();
            for frag in fragments {
                for (k, v) in frag {
                    if out.insert(k.clone(), v).is_some() {
                        log::warn!("predicate key '{k}' replaced by a later filter");
                        overwritten.push(k);
                    }
                }
            }
            (out, overwritten)
        }
        MergePolicy::Conjunction => {
            let predicate = if fragments.len() == 1 {
                fragments.into_iter().next().unwrap_or_default()
            } else {
                doc! { "$and": fragments }
            };
            (predicate, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(field: &str, op: Operator, v: impl Into<Bson>) -> Filter {
        Filter::of(field, op, v).unwrap()
    }

    #[test]
    fn simple_operators_map_to_bson_keys() {
        let cases = [
            (Operator::Equal, doc! {"a": {"$eq": "1"}}),
            (Operator::NotEqual, doc! {"a": {"$ne": "1"}}),
            (Operator::Gt, doc! {"a": {"$gt": "1"}}),
            (Operator::Gte, doc! {"a": {"$gte": "1"}}),
            (Operator::Lt, doc! {"a": {"$lt": "1"}}),
            (Operator::Lte, doc! {"a": {"$lte": "1"}}),
            (Operator::Contains, doc! {"a": {"$regex": "1"}}),
            (Operator::NotContains, doc! {"a": {"$not": {"$regex": "1"}}}),
        ];
        for (op, expected) in cases {
            assert_eq!(fragment(&f("a", op, 1), ScalarEncoding::Canonical).unwrap(), expected);
        }
    }

    #[test]
    fn typed_encoding_keeps_numbers() {
        let frag = fragment(&f("age", Operator::Gt, 18), ScalarEncoding::Typed).unwrap();
        assert_eq!(frag, doc! {"age": {"$gt": 18}});
        let frag = fragment(&f("name", Operator::Contains, "jo"), ScalarEncoding::Typed).unwrap();
        assert_eq!(frag, doc! {"name": {"$regex": "jo"}});
    }

    #[test]
    fn contains_pattern_is_not_escaped() {
        let frag = fragment(&f("name", Operator::Contains, "^a.c$"), ScalarEncoding::Canonical).unwrap();
        assert_eq!(frag, doc! {"name": {"$regex": "^a.c$"}});
    }

    #[test]
    fn in_requires_a_list() {
        let frag = fragment(&f("tag", Operator::In, bson::bson!(["a", "b"])), ScalarEncoding::Canonical)
            .unwrap();
        assert_eq!(frag, doc! {"tag": {"$in": ["a", "b"]}});
        let frag = fragment(&f("tag", Operator::NotIn, bson::bson!([1])), ScalarEncoding::Canonical).unwrap();
        assert_eq!(frag, doc! {"tag": {"$nin": [1]}});
        let e = fragment(&f("tag", Operator::In, "a"), ScalarEncoding::Canonical).unwrap_err();
        assert_eq!(e.to_string(), IN_SHAPE);
    }

    #[test]
    fn merge_last_write_wins() {
        let (out, replaced) = merge(vec![doc! {"a": 1, "b": 2}, doc! {"a": 3}], MergePolicy::LastWriteWins);
        assert_eq!(out, doc! {"a": 3, "b": 2});
        assert_eq!(replaced, ["a"]);
    }

    #[test]
    fn merge_conjunction() {
        let (out, replaced) = merge(vec![doc! {"a": 1}, doc! {"a": 3}], MergePolicy::Conjunction);
        assert_eq!(out, doc! {"$and": [{"a": 1}, {"a": 3}]});
        assert!(replaced.is_empty());
        assert_eq!(merge(vec![doc! {"a": 1}], MergePolicy::Conjunction).0, doc! {"a": 1});
    }
}
