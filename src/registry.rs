use std::collections::HashMap;

use actix_session::{Session, SessionInsertError};
use serde::{Deserialize, Serialize};

const MY_SIGNUPS_KEY: &str = "my_signups";

/// The names this device has added, keyed by slot. The whole mapping rides
/// in the session cookie as one JSON value, so it lives in the browser and
/// nowhere else: clearing cookies or switching devices forfeits the removal
/// rights recorded here.
///
/// This is the sole basis for letting a non-admin remove a name. It is a
/// convenience, not a security boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MySignups(HashMap<String, Vec<String>>);

impl MySignups {
    /// Reads the mapping from the session. A missing or unreadable value is
    /// treated as empty rather than an error.
    pub fn load(session: &Session) -> Self {
        session
            .get::<MySignups>(MY_SIGNUPS_KEY)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Writes the mapping back into the session.
    pub fn save(&self, session: &Session) -> Result<(), SessionInsertError> {
        session.insert(MY_SIGNUPS_KEY, self)
    }

    pub fn add(&mut self, slot_key: &str, name: &str) {
        let names = self.0.entry(slot_key.to_string()).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    pub fn remove(&mut self, slot_key: &str, name: &str) {
        if let Some(names) = self.0.get_mut(slot_key) {
            names.retain(|n| n != name);
            if names.is_empty() {
                self.0.remove(slot_key);
            }
        }
    }

    pub fn contains(&self, slot_key: &str, name: &str) -> bool {
        self.0
            .get(slot_key)
            .map(|names| names.iter().any(|n| n == name))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
