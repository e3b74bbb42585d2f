//! Evaluates compiled predicate and sort documents against BSON documents.

use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use crate::errors::CriteriaError;

const MAX_PATH_DEPTH: usize = 32;

/// `$regex` patterns of one predicate, compiled once up front.
#[derive(Debug, Default)]
struct Patterns {
    #[cfg(feature = "regex")]
    compiled: std::collections::HashMap<String, regex::Regex>,
}

impl Patterns {
    fn collect(predicate: &BsonDocument) -> Result<Self, CriteriaError> {
        let mut pats = Self::default();
        pats.walk_doc(predicate)?;
        Ok(pats)
    }

    fn walk_doc(&mut self, d: &BsonDocument) -> Result<(), CriteriaError> {
        for (k, v) in d {
            match (k.as_str(), v) {
                ("$regex", Bson::String(p)) => self.add(p)?,
                (_, Bson::Document(inner)) => self.walk_doc(inner)?,
                (_, Bson::Array(items)) => {
                    for item in items {
                        if let Bson::Document(inner) = item {
                            self.walk_doc(inner)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    #[cfg(feature = "regex")]
    fn add(&mut self, pattern: &str) -> Result<(), CriteriaError> {
        if !self.compiled.contains_key(pattern) {
            let re = regex::Regex::new(pattern).map_err(|e| {
                CriteriaError::InvalidShape(format!("invalid CONTAINS pattern {pattern}: {e}"))
            })?;
            self.compiled.insert(pattern.to_owned(), re);
        }
        Ok(())
    }

    #[cfg(not(feature = "regex"))]
    fn add(&mut self, _pattern: &str) -> Result<(), CriteriaError> {
        Ok(())
    }

    #[cfg(feature = "regex")]
    fn is_match(&self, s: &str, pattern: &str) -> Result<bool, CriteriaError> {
        self.compiled
            .get(pattern)
            .map(|re| re.is_match(s))
            .ok_or_else(|| CriteriaError::Internal(format!("pattern {pattern} was not compiled")))
    }

    // Without the regex engine, patterns are matched as plain substrings.
    #[cfg(not(feature = "regex"))]
    fn is_match(&self, s: &str, pattern: &str) -> Result<bool, CriteriaError> {
        Ok(s.contains(pattern))
    }
}

/// A predicate document prepared for evaluation against many documents.
#[derive(Debug)]
pub struct Matcher<'a> {
    predicate: &'a BsonDocument,
    patterns: Patterns,
}

impl<'a> Matcher<'a> {
    /// Fails on an invalid `$regex` pattern before any document is read.
    pub fn new(predicate: &'a BsonDocument) -> Result<Self, CriteriaError> {
        Ok(Self { predicate, patterns: Patterns::collect(predicate)? })
    }

    /// Whether `doc` satisfies the predicate. An operator this evaluator
    /// does not know means the converter and the store have drifted apart.
    pub fn matches(&self, doc: &BsonDocument) -> Result<bool, CriteriaError> {
        self.matches_doc(doc, self.predicate)
    }

    fn matches_doc(&self, doc: &BsonDocument, predicate: &BsonDocument) -> Result<bool, CriteriaError> {
        for (key, cond) in predicate {
            let ok = match key.as_str() {
                "$or" => {
                    let mut any = false;
                    for branch in branches(key, cond)? {
                        if self.matches_doc(doc, branch)? {
                            any = true;
                            break;
                        }
                    }
                    any
                }
                "$and" => {
                    let mut all = true;
                    for branch in branches(key, cond)? {
                        if !self.matches_doc(doc, branch)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                k if k.starts_with('$') => {
                    return Err(CriteriaError::Internal(format!("unsupported top-level operator {k}")));
                }
                path => self.field_matches(get_path(doc, path), cond)?,
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn field_matches(&self, value: Option<&Bson>, cond: &Bson) -> Result<bool, CriteriaError> {
        let Some(ops) = is_operator_doc(cond) else {
            return Ok(value.is_some_and(|v| values_equal(v, cond)));
        };
        for (op, arg) in ops {
            if !self.apply(op, value, arg)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn apply(&self, op: &str, value: Option<&Bson>, arg: &Bson) -> Result<bool, CriteriaError> {
        let ordered = |want: fn(Ordering) -> bool| {
            value.and_then(|v| compare_same_class(v, arg)).is_some_and(want)
        };
        Ok(match op {
            "$eq" => value.is_some_and(|v| values_equal(v, arg)),
            "$ne" => !value.is_some_and(|v| values_equal(v, arg)),
            "$gt" => ordered(|o| o == Ordering::Greater),
            "$gte" => ordered(|o| o != Ordering::Less),
            "$lt" => ordered(|o| o == Ordering::Less),
            "$lte" => ordered(|o| o != Ordering::Greater),
            "$in" => in_set(value, op, arg)?,
            "$nin" => !in_set(value, op, arg)?,
            "$regex" => match (value.and_then(as_text), arg) {
                (Some(s), Bson::String(pattern)) => self.patterns.is_match(s, pattern)?,
                (None, Bson::String(_)) => false,
                _ => return Err(CriteriaError::Internal("$regex expects a string pattern".into())),
            },
            "$not" => !self.field_matches(value, arg)?,
            other => {
                return Err(CriteriaError::Internal(format!("unsupported predicate operator {other}")));
            }
        })
    }
}

/// One-off evaluation; prefer [`Matcher`] when scanning many documents.
pub fn matches(doc: &BsonDocument, predicate: &BsonDocument) -> Result<bool, CriteriaError> {
    Matcher::new(predicate)?.matches(doc)
}

fn branches<'a>(key: &str, cond: &'a Bson) -> Result<Vec<&'a BsonDocument>, CriteriaError> {
    let Bson::Array(items) = cond else {
        return Err(CriteriaError::Internal(format!("{key} expects an array")));
    };
    items
        .iter()
        .map(|b| match b {
            Bson::Document(d) => Ok(d),
            _ => Err(CriteriaError::Internal(format!("{key} expects documents"))),
        })
        .collect()
}

fn is_operator_doc(cond: &Bson) -> Option<&BsonDocument> {
    match cond {
        Bson::Document(d) if d.keys().next().is_some_and(|k| k.starts_with('$')) => Some(d),
        _ => None,
    }
}

fn in_set(value: Option<&Bson>, op: &str, arg: &Bson) -> Result<bool, CriteriaError> {
    let Bson::Array(set) = arg else {
        return Err(CriteriaError::Internal(format!("{op} expects an array")));
    };
    Ok(value.is_some_and(|v| set.iter().any(|x| values_equal(v, x))))
}

fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() {
        return None;
    }
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?)?;
    for (depth, part) in parts.enumerate() {
        if depth >= MAX_PATH_DEPTH {
            return None;
        }
        match cur {
            Bson::Document(d) => cur = d.get(part)?,
            _ => return None,
        }
    }
    Some(cur)
}

/// Every numeric type maps to an `f64`. A `Decimal128` that does not parse
/// becomes NaN, so all numbers stay in one totally ordered class.
fn as_f64(x: &Bson) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    match x {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => Some(d.to_string().parse::<f64>().unwrap_or(f64::NAN)),
        _ => None,
    }
}

fn as_text(x: &Bson) -> Option<&str> {
    match x {
        Bson::String(s) | Bson::Symbol(s) => Some(s),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (as_text(a), as_text(b)) {
        return x == y;
    }
    a == b
}

/// Ordering within one comparable class (numbers, text, booleans, dates,
/// object ids). `None` across classes, as range operators never match there.
fn compare_same_class(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return Some(x.total_cmp(&y));
    }
    if let (Some(x), Some(y)) = (as_text(a), as_text(b)) {
        return Some(x.cmp(y));
    }
    match (a, b) {
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.timestamp_millis().cmp(&y.timestamp_millis())),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        _ => None,
    }
}

/// Total order for sorting: same-class comparison, else by type rank.
/// Values without a same-class order share a rank only with themselves.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    compare_same_class(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

const fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 13,
        _ => 12,
    }
}

/// Compare two documents by a sort document (`{field: 1 | -1, ...}`).
/// Missing fields sort before present ones.
pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &BsonDocument) -> Ordering {
    for (field, dir) in sort {
        let ord = match (get_path(a, field), get_path(b, field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            let descending = as_f64(dir).is_some_and(|d| d < 0.0);
            return if descending { ord.reverse() } else { ord };
        }
    }
    Ordering::Equal
}
