//! Current-user projection.
//!
//! A request-scoped, immutable view of the authenticated user derived from
//! session data. Templates consume it directly, so the shape is part of the
//! rendering contract:
//!
//! - `roles` only ever contains roles the user holds. An unassigned role is
//!   absent, never `false`.
//! - `status` carries exactly the five known account flags.

use plinth_commons::{RoleSet, UserStatus};
use serde::Serialize;
use serde_json::Value;

/// Profile slice exposed to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub alias: String,
    pub locale: String,
}

/// Template-safe view of the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentUser {
    pub auth: bool,
    pub id: String,
    pub roles: RoleSet,
    pub status: UserStatus,
    pub profile: Profile,
}

impl CurrentUser {
    /// Build the projection from session data.
    ///
    /// `db_roles` is the fresh role-store lookup; a non-empty result wins
    /// over whatever role list was embedded in the session. `None` (store
    /// not consulted) and an empty lookup both fall back to session roles.
    ///
    /// Any malformed shape — non-mapping session data, non-mapping
    /// `user_data`, or a falsy user id — yields the unauthenticated default.
    pub fn project(session_data: &Value, db_roles: Option<Vec<String>>) -> Self {
        let Some(user_data) = user_data_map(session_data) else {
            return Self::default();
        };

        let user_id = stringify_truthy(user_data.get("userId"));
        if user_id.is_empty() {
            return Self::default();
        }

        let session_roles: Vec<String> = user_data
            .get("roles")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(|v| stringify_truthy(Some(v))).collect())
            .unwrap_or_default();

        let roles = match db_roles {
            Some(fresh) if !fresh.is_empty() => RoleSet::from_codes(fresh),
            _ => RoleSet::from_codes(session_roles),
        };

        let status = user_data
            .get("user_disabled")
            .map(UserStatus::from_disabled_map)
            .unwrap_or_default();

        Self {
            auth: true,
            id: user_id,
            roles,
            status,
            profile: Profile {
                alias: stringify_truthy(user_data.get("alias")),
                locale: stringify_truthy(user_data.get("locale")),
            },
        }
    }
}

/// Extract the stringified user id from session data, if any.
///
/// The dispatcher uses this to decide whether the role store needs to be
/// consulted at all: no user id, no query.
pub fn user_id_from_session(session_data: &Value) -> Option<String> {
    let user_data = user_data_map(session_data)?;
    let id = stringify_truthy(user_data.get("userId"));
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn user_data_map(session_data: &Value) -> Option<&serde_json::Map<String, Value>> {
    session_data.as_object()?.get("user_data")?.as_object()
}

/// String coercion with falsy-to-empty semantics: null, false, zero, and
/// the empty string all coerce to "".
fn stringify_truthy(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => {
            if n.as_f64() == Some(0.0) {
                String::new()
            } else {
                n.to_string()
            }
        }
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_unauthenticated() {
        let user = CurrentUser::default();
        assert!(!user.auth);
        assert_eq!(user.id, "");
        assert!(user.roles.is_empty());
        assert!(!user.status.any());
        assert_eq!(user.profile, Profile::default());
    }

    #[test]
    fn test_projection_from_session_data() {
        let session_data = json!({
            "user_data": {
                "userId": "42",
                "roles": ["Admin", " dev "],
                "user_disabled": { "spam": true },
            }
        });

        let user = CurrentUser::project(&session_data, None);
        assert!(user.auth);
        assert_eq!(user.id, "42");
        assert!(user.roles.contains_key("role_admin"));
        assert!(user.roles.contains_key("role_dev"));
        assert_eq!(user.roles.len(), 2);
        assert!(user.status.spam);
        assert!(!user.status.deleted);
        assert!(!user.status.unconfirmed);
        assert!(!user.status.unvalidated);
        assert!(!user.status.moderated);

        // The serialized role map is sparse: no key for an unheld role.
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json["roles"],
            json!({ "role_admin": "role_admin", "role_dev": "role_dev" })
        );
        assert!(json["roles"].get("role_editor").is_none());
    }

    #[test]
    fn test_fresh_roles_win_over_session_roles() {
        let session_data = json!({
            "user_data": { "userId": "7", "roles": ["stale"] }
        });

        let user = CurrentUser::project(&session_data, Some(vec!["editor".to_string()]));
        assert!(user.roles.contains_key("role_editor"));
        assert!(!user.roles.contains_key("role_stale"));
    }

    #[test]
    fn test_empty_store_result_falls_back_to_session_roles() {
        let session_data = json!({
            "user_data": { "userId": "7", "roles": ["moderator"] }
        });

        let user = CurrentUser::project(&session_data, Some(Vec::new()));
        assert!(user.roles.contains_key("role_moderator"));
    }

    #[test]
    fn test_malformed_shapes_yield_default() {
        assert_eq!(CurrentUser::project(&json!("nope"), None), CurrentUser::default());
        assert_eq!(
            CurrentUser::project(&json!({ "user_data": [1, 2] }), None),
            CurrentUser::default()
        );
        assert_eq!(
            CurrentUser::project(&json!({ "user_data": { "userId": "" } }), None),
            CurrentUser::default()
        );
        assert_eq!(
            CurrentUser::project(&json!({ "user_data": { "userId": 0 } }), None),
            CurrentUser::default()
        );
        assert_eq!(CurrentUser::project(&json!({}), None), CurrentUser::default());
    }

    #[test]
    fn test_numeric_user_id_is_stringified() {
        let session_data = json!({ "user_data": { "userId": 42 } });
        let user = CurrentUser::project(&session_data, None);
        assert!(user.auth);
        assert_eq!(user.id, "42");
    }

    #[test]
    fn test_profile_defaults_to_empty_strings() {
        let session_data = json!({
            "user_data": { "userId": "1", "alias": null }
        });
        let user = CurrentUser::project(&session_data, None);
        assert_eq!(user.profile.alias, "");
        assert_eq!(user.profile.locale, "");
    }

    #[test]
    fn test_user_id_from_session() {
        assert_eq!(
            user_id_from_session(&json!({ "user_data": { "userId": "9" } })),
            Some("9".to_string())
        );
        assert_eq!(user_id_from_session(&json!({})), None);
        assert_eq!(user_id_from_session(&json!({ "user_data": { "userId": "" } })), None);
    }
}
