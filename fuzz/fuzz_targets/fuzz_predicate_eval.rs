#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        let Ok(c) = criteria_bson::criteria::parse_criteria_json(s) else { return };
        let Ok(q) = criteria_bson::convert(&c) else { return };
        let doc = bson::doc! {"_id": 1, "name": "x", "age": 30, "tags": ["a", "b"]};
        let _ = criteria_bson::repository::matches(&doc, &q.predicate);
    }
});
