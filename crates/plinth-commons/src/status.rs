//! Account status flags.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The five account status flags carried by the current-user projection.
///
/// Only these named flags are read from the session's `user_disabled`
/// mapping; anything else stored there is ignored, and missing flags
/// default to false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub deleted: bool,
    pub unconfirmed: bool,
    pub unvalidated: bool,
    pub moderated: bool,
    pub spam: bool,
}

impl UserStatus {
    /// Read the five known flags out of a `user_disabled` JSON mapping.
    ///
    /// Non-mapping input yields the all-false default.
    pub fn from_disabled_map(disabled: &Value) -> Self {
        let Some(map) = disabled.as_object() else {
            return Self::default();
        };
        let flag = |key: &str| map.get(key).map(truthy).unwrap_or(false);
        Self {
            deleted: flag("deleted"),
            unconfirmed: flag("unconfirmed"),
            unvalidated: flag("unvalidated"),
            moderated: flag("moderated"),
            spam: flag("spam"),
        }
    }

    /// Whether any flag disables the account.
    pub fn any(&self) -> bool {
        self.deleted || self.unconfirmed || self.unvalidated || self.moderated || self.spam
    }
}

/// Loose truthiness for flag values that may arrive as bool, number, or string.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_all_false() {
        let status = UserStatus::default();
        assert!(!status.any());
    }

    #[test]
    fn test_reads_only_known_flags() {
        let status = UserStatus::from_disabled_map(&json!({
            "spam": true,
            "banned": true,
            "deleted": false,
        }));
        assert!(status.spam);
        assert!(!status.deleted);
        assert!(!status.moderated);
    }

    #[test]
    fn test_non_mapping_input() {
        assert_eq!(UserStatus::from_disabled_map(&json!("oops")), UserStatus::default());
        assert_eq!(UserStatus::from_disabled_map(&Value::Null), UserStatus::default());
    }

    #[test]
    fn test_truthy_coercion() {
        let status = UserStatus::from_disabled_map(&json!({
            "deleted": 1,
            "moderated": "yes",
            "unconfirmed": 0,
        }));
        assert!(status.deleted);
        assert!(status.moderated);
        assert!(!status.unconfirmed);
    }
}
