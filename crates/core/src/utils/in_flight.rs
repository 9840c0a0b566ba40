//! Tracking of outstanding mutations to prevent double submission.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::errors::{Error, Result};

/// Set of mutation keys that currently have a request outstanding.
#[derive(Debug, Clone, Default)]
pub struct InFlightSet {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` for the lifetime of the returned guard.
    ///
    /// Fails with [`Error::MutationInFlight`] if the key is already claimed.
    pub fn try_acquire(&self, key: impl Into<String>) -> Result<InFlightGuard> {
        let key = key.into();
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| Error::Unexpected("in-flight set lock poisoned".to_string()))?;
        if !keys.insert(key.clone()) {
            return Err(Error::MutationInFlight(key));
        }
        Ok(InFlightGuard {
            keys: self.keys.clone(),
            key,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }
}

/// Releases its key when dropped, including on early return or cancellation.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut keys) = self.keys.lock() {
            keys.remove(&self.key);
        }
    }
}
