//! Role-set model for the current-user projection.
//!
//! Roles are carried as a set of canonical `role_*` keys. The set serializes
//! to the sparse `{"role_x": "role_x"}` map that templates consume: only
//! roles the user actually holds appear, and a `false` entry is
//! unrepresentable by construction.

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix applied to every canonical role key.
pub const ROLE_KEY_PREFIX: &str = "role_";

/// Canonical role key for a raw role code.
///
/// Codes are trimmed and lower-cased before prefixing; blank codes yield
/// `None` and must not enter the set.
pub fn role_key(code: &str) -> Option<String> {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        return None;
    }
    Some(format!("{ROLE_KEY_PREFIX}{code}"))
}

/// Set of canonical role keys held by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// Empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a role set from raw role codes, normalizing each one.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for code in codes {
            set.insert_code(code.as_ref());
        }
        set
    }

    /// Insert a raw role code. Blank codes are dropped.
    pub fn insert_code(&mut self, code: &str) {
        if let Some(key) = role_key(code) {
            self.0.insert(key);
        }
    }

    /// Whether the user holds the given raw role code.
    pub fn contains_code(&self, code: &str) -> bool {
        match role_key(code) {
            Some(key) => self.0.contains(&key),
            None => false,
        }
    }

    /// Whether the user holds the given canonical key (`role_*`).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over canonical keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Serialize for RoleSet {
    /// Serializes as the sparse map `{"role_x": "role_x"}`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for key in &self.0 {
            map.serialize_entry(key, key)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    /// Accepts the sparse map shape and keeps only the keys.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = std::collections::BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(Self(map.into_keys().collect()))
    }
}
