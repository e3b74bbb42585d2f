use parking_lot::Mutex;
use std::collections::HashSet;

use crate::errors::CriteriaError;

/// Run-once guard for per-collection index creation.
///
/// Scoped to whoever owns it (share with `Arc` across repositories). A failed
/// initialisation is not recorded, so the next call tries again.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    done: Mutex<HashSet<String>>,
}

impl IndexRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `init` the first time `key` is seen. Returns whether it ran.
    /// The lock is held during `init`, so concurrent callers wait rather than
    /// initialising twice.
    pub fn ensure_once<F>(&self, key: &str, init: F) -> Result<bool, CriteriaError>
    where
        F: FnOnce() -> Result<(), CriteriaError>,
    {
        let mut done = self.done.lock();
        if done.contains(key) {
            return Ok(false);
        }
        init()?;
        done.insert(key.to_owned());
        Ok(true)
    }

    #[must_use]
    pub fn is_initialized(&self, key: &str) -> bool {
        self.done.lock().contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_once_per_key() {
        let reg = IndexRegistry::new();
        let calls = AtomicUsize::new(0);
        let bump = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        assert!(reg.ensure_once("users", bump).unwrap());
        assert!(!reg.ensure_once("users", bump).unwrap());
        assert!(reg.ensure_once("orders", bump).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failure_is_retried() {
        let reg = IndexRegistry::new();
        let e = reg.ensure_once("users", || Err(CriteriaError::Io("down".into()))).unwrap_err();
        assert!(matches!(e, CriteriaError::Io(_)));
        assert!(!reg.is_initialized("users"));
        assert!(reg.ensure_once("users", || Ok(())).unwrap());
        assert!(reg.is_initialized("users"));
    }

    #[test]
    fn concurrent_callers_initialise_once() {
        let reg = Arc::new(IndexRegistry::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    reg.ensure_once("shared", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .unwrap()
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
