use bson::{Bson, Document as BsonDocument};

use crate::errors::CriteriaError;

/// Convert a `serde_json::Value` into BSON. Extended-JSON wrappers such as
/// `{"$date": ...}` are honoured, so dates can travel through JSON input.
pub fn json_to_bson(val: serde_json::Value) -> Result<Bson, CriteriaError> {
    Bson::try_from(val).map_err(|e| CriteriaError::invalid(format!("invalid JSON value: {e}")))
}

/// Convert a `serde_json::Value` that must be an object into a `bson::Document`.
pub fn json_object_to_document(val: &serde_json::Value) -> Result<BsonDocument, CriteriaError> {
    let obj = val.as_object().ok_or_else(|| CriteriaError::invalid("expected JSON object"))?;
    BsonDocument::try_from(obj.clone())
        .map_err(|e| CriteriaError::invalid(format!("invalid JSON object: {e}")))
}

/// Relaxed extended JSON text for a BSON value.
#[must_use]
pub fn to_json_string(val: &Bson) -> String {
    val.clone().into_relaxed_extjson().to_string()
}

/// The "natural" string form of a BSON value: strings verbatim, integral
/// doubles without a fractional part, dates as RFC 3339, everything
/// structured as relaxed extended JSON.
#[must_use]
pub fn natural_string(val: &Bson) -> String {
    match val {
        Bson::String(s) => s.clone(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => format_double(*f),
        Bson::Boolean(b) => b.to_string(),
        Bson::Null | Bson::Undefined => "null".to_string(),
        Bson::DateTime(dt) => {
            dt.try_to_rfc3339_string().unwrap_or_else(|_| dt.timestamp_millis().to_string())
        }
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::Decimal128(d) => d.to_string(),
        Bson::Symbol(s) => s.clone(),
        other => to_json_string(other),
    }
}

/// Number-to-string in the ECMAScript style: `NaN`, `Infinity`, exponent
/// form (`1e+21`, `1.5e-7`) outside `[1e-6, 1e21)`, plain digits otherwise.
#[allow(clippy::cast_possible_truncation)]
fn format_double(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = f.abs();
    // 2^53: beyond this integral doubles stop round-tripping through i64 exactly.
    if f.fract() == 0.0 && abs < 9_007_199_254_740_992.0 {
        return (f as i64).to_string();
    }
    if abs >= 1e21 || abs < 1e-6 {
        let exp = format!("{f:e}");
        return match exp.split_once('e') {
            Some((mantissa, e)) if !e.starts_with('-') => format!("{mantissa}e+{e}"),
            _ => exp,
        };
    }
    f.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_string_of_primitives() {
        assert_eq!(natural_string(&Bson::String("x".into())), "x");
        assert_eq!(natural_string(&Bson::Int32(18)), "18");
        assert_eq!(natural_string(&Bson::Double(18.0)), "18");
        assert_eq!(natural_string(&Bson::Double(1.5)), "1.5");
        assert_eq!(natural_string(&Bson::Boolean(false)), "false");
        assert_eq!(natural_string(&Bson::Null), "null");
    }

    #[test]
    fn doubles_format_like_js_numbers() {
        assert_eq!(format_double(f64::INFINITY), "Infinity");
        assert_eq!(format_double(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_double(1e21), "1e+21");
        assert_eq!(format_double(-2.5e22), "-2.5e+22");
        assert_eq!(format_double(1e20), "100000000000000000000");
        assert_eq!(format_double(1.5e-7), "1.5e-7");
        assert_eq!(format_double(0.000_001), "0.000001");
        assert_eq!(format_double(-0.0), "0");
    }

    #[test]
    fn json_object_rejects_array() {
        let e = json_object_to_document(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(e.is_validation());
    }

    #[test]
    fn json_object_to_document_keeps_keys() {
        let d = json_object_to_document(&serde_json::json!({"a": 1, "b": "x"})).unwrap();
        assert_eq!(d.get_str("b").unwrap(), "x");
        assert!(d.contains_key("a"));
    }
}
