//! Structured trace of converter runs.
//!
//! Each [`ConvertEvent`] is written as one JSON line to the
//! `criteria_bson::trace` log target. A [`Capture`] additionally collects the
//! events raised on its own thread, so tests can assert on them without a
//! logger installed.

use serde::Serialize;
use std::cell::RefCell;
use std::marker::PhantomData;

use crate::config::MergePolicy;

/// Log target for converter trace lines.
pub const TRACE_TARGET: &str = "criteria_bson::trace";

/// Summary of one `Converter::convert` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertEvent {
    pub filters: usize,
    pub predicate_keys: usize,
    pub merge: MergePolicy,
    /// Top-level predicate keys dropped by last-write-wins merging.
    pub overwritten: Vec<String>,
    pub skip: u64,
    pub limit: u64,
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<ConvertEvent>>> = const { RefCell::new(None) };
}

/// Collects events on the current thread until dropped. Not `Send`.
pub struct Capture {
    _thread_bound: PhantomData<*const ()>,
}

impl Capture {
    /// Start collecting. Any events held by an earlier capture are discarded.
    #[must_use]
    pub fn start() -> Self {
        CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
        Self { _thread_bound: PhantomData }
    }

    /// Events recorded since the last `take`.
    pub fn take(&self) -> Vec<ConvertEvent> {
        CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}

pub(crate) fn record(event: ConvertEvent) {
    if log::log_enabled!(target: TRACE_TARGET, log::Level::Trace) {
        match serde_json::to_string(&event) {
            Ok(line) => log::trace!(target: TRACE_TARGET, "{line}"),
            Err(e) => log::warn!("unserialisable convert event: {e}"),
        }
    }
    CAPTURED.with(|c| {
        if let Some(events) = c.borrow_mut().as_mut() {
            events.push(event);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(filters: usize) -> ConvertEvent {
        ConvertEvent {
            filters,
            predicate_keys: filters,
            merge: MergePolicy::LastWriteWins,
            overwritten: Vec::new(),
            skip: 0,
            limit: 0,
        }
    }

    #[test]
    fn nothing_kept_without_capture() {
        record(event(1));
        let cap = Capture::start();
        assert!(cap.take().is_empty());
    }

    #[test]
    fn take_drains_in_order() {
        let cap = Capture::start();
        record(event(1));
        record(event(2));
        let got: Vec<usize> = cap.take().iter().map(|e| e.filters).collect();
        assert_eq!(got, [1, 2]);
        assert!(cap.take().is_empty());
    }

    #[test]
    fn other_threads_are_not_captured() {
        let cap = Capture::start();
        std::thread::spawn(|| record(event(9))).join().unwrap();
        assert!(cap.take().is_empty());
    }

    #[test]
    fn serialises_as_one_json_line() {
        let mut e = event(2);
        e.overwritten = vec!["age".into()];
        let line = serde_json::to_string(&e).unwrap();
        assert!(line.contains("\"merge\":\"last_write_wins\""));
        assert!(line.contains("\"overwritten\":[\"age\"]"));
    }
}
