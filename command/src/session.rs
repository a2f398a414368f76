//! Session context threaded through every action.
//!
//! A [`Session`] carries the cooperative cancellation signal and the
//! [`Profile`] of settings values. The framework itself only writes one
//! well-known key per command (`cmd.<path>.disabled`, the cached disablement
//! state); everything else belongs to the application.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::error::Error;

/// Key-value settings profile with JSON values.
///
/// Thread-safe via interior locking; both the disablement cache write and
/// subsequent reads go through the same lock.
#[derive(Debug, Default)]
pub struct Profile {
    values: Mutex<HashMap<String, Value>>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// Stores `value` under `key`.
    pub fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Profile("profile lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Per-invocation session handed to every lifecycle action.
///
/// # Examples
///
/// ```
/// use happy_command::Session;
///
/// let session = Session::new();
/// assert!(!session.is_cancelled());
/// session.cancel();
/// assert!(session.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct Session {
    profile: Profile,
    cancelled: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings profile for this session.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Signals cancellation (e.g., from a SIGINT handler). Actions observe
    /// this cooperatively; no phase is interrupted by the framework.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_round_trip() {
        let profile = Profile::new();
        assert!(profile.get("cmd.app.disabled").is_none());
        profile.set("cmd.app.disabled", json!(true)).unwrap();
        assert_eq!(profile.get("cmd.app.disabled"), Some(json!(true)));
    }

    #[test]
    fn test_session_cancellation_is_sticky() {
        let session = Session::new();
        session.cancel();
        session.cancel();
        assert!(session.is_cancelled());
    }
}
