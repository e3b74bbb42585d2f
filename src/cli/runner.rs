use std::io::{BufRead, BufReader, Write};

use super::command::Command;
use super::util::read_arg;
use crate::converter::Converter;
use crate::criteria::parse_criteria_json;
use crate::errors::CriteriaError;
use crate::repository::{CriteriaRepository, MemoryStore};
use crate::utils::json::json_object_to_document;

/// Execute one subcommand, writing its output to `out`.
pub fn run<W: Write>(converter: &Converter, cmd: Command, out: &mut W) -> Result<(), CriteriaError> {
    match cmd {
        Command::Compile { request, pretty } => {
            let criteria = parse_criteria_json(&read_arg(&request)?)?;
            let json = converter.convert(&criteria)?.to_json();
            let text =
                if pretty { serde_json::to_string_pretty(&json)? } else { serde_json::to_string(&json)? };
            writeln!(out, "{text}")?;
        }
        Command::Check { request } => {
            let criteria = parse_criteria_json(&read_arg(&request)?)?;
            converter.convert(&criteria)?;
            writeln!(
                out,
                "ok: {} filter(s), order={}, limit={:?}, page={:?}, offset={:?}",
                criteria.filters().len(),
                criteria.order().order_by().map_or("none", |k| k.as_str()),
                criteria.limit(),
                criteria.current_page(),
                criteria.offset()
            )?;
        }
        Command::Run { request, data } => {
            let criteria = parse_criteria_json(&read_arg(&request)?)?;
            let store = MemoryStore::new(data.display().to_string());
            let reader = BufReader::new(std::fs::File::open(&data)?);
            for (n, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let val: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
                    CriteriaError::invalid(format!("{}:{}: {e}", data.display(), n + 1))
                })?;
                store.insert(json_object_to_document(&val)?);
            }
            let page = CriteriaRepository::new(store, converter.clone()).search(&criteria)?;
            for doc in page.items {
                writeln!(out, "{}", bson::Bson::Document(doc).into_relaxed_extjson())?;
            }
            log::info!("run {}: total={} next_page={:?}", data.display(), page.total, page.next_page);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(cmd: Command) -> Result<String, CriteriaError> {
        let mut buf = Vec::new();
        run(&Converter::default(), cmd, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn compile_prints_query_json() {
        let out = output(Command::Compile {
            request: r#"{"filters": [{"field": "age", "operator": ">", "value": 18}], "limit": 10, "page": 2}"#
                .into(),
            pretty: false,
        })
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["predicate"]["age"]["$gt"], "18");
        assert_eq!(v["sort"]["_id"], -1);
        assert_eq!((v["skip"].as_u64(), v["limit"].as_u64()), (Some(10), Some(10)));
    }

    #[test]
    fn check_summarises() {
        let out = output(Command::Check { request: r#"{"orderBy": "name", "limit": 5, "page": 3}"#.into() })
            .unwrap();
        assert_eq!(out.trim(), "ok: 0 filter(s), order=name, limit=Some(5), page=Some(3), offset=Some(10)");
    }

    #[test]
    fn shape_errors_propagate() {
        let e = output(Command::Check {
            request: r#"{"filters": [{"field": "d", "operator": "BETWEEN", "value": 3}]}"#.into(),
        })
        .unwrap_err();
        assert!(e.is_domain());
    }

    #[test]
    fn run_reads_request_and_data_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("people.ndjson");
        std::fs::write(&data, "{\"_id\": 1, \"name\": \"ann\"}\n\n{\"_id\": 2, \"name\": \"bob\"}\n").unwrap();
        let req = dir.path().join("req.json");
        std::fs::write(&req, r#"{"filters": [{"field": "name", "operator": "CONTAINS", "value": "b"}]}"#).unwrap();
        let out = output(Command::Run { request: format!("@{}", req.display()), data }).unwrap();
        assert_eq!(out.trim(), r#"{"name":"bob"}"#);
    }
}
