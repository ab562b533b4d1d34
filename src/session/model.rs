use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

pub const ADMIN_ROLE: &str = "ADMIN";

/// The signed-in user as returned by the auth and profile endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Serialized as `role`; older backends send a single string
    #[serde(rename = "role", default, deserialize_with = "one_or_many")]
    pub roles: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_gradient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null,
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => BTreeSet::from([role]),
        OneOrMany::Many(roles) => roles.into_iter().collect(),
        OneOrMany::Null => BTreeSet::new(),
    })
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(ADMIN_ROLE)
    }
}

/// One signed-in identity. The refresh credential is not part of it: it lives
/// in the HTTP client's cookie jar.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl Session {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn display_name(&self) -> &str {
        &self.user.name
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.user.roles
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// Body of `/auth/login`, `/auth/register` and `/auth/google`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_from_array_or_string() {
        let user: User = serde_json::from_value(json!({
            "id": "u1", "name": "Ada", "email": "ada@example.com", "role": ["USER", "ADMIN"]
        }))
        .unwrap();
        assert!(user.is_admin());
        assert_eq!(user.roles.len(), 2);

        let user: User = serde_json::from_value(json!({
            "_id": "u2", "name": "Bob", "email": "bob@example.com", "role": "USER"
        }))
        .unwrap();
        assert_eq!(user.id, "u2");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_missing_role_is_empty() {
        let user: User = serde_json::from_value(json!({
            "id": "u3", "name": "Cy", "email": "cy@example.com"
        }))
        .unwrap();
        assert!(user.roles.is_empty());
    }

    #[test]
    fn test_auth_response_ignores_refresh_token() {
        let response: AuthResponse = serde_json::from_value(json!({
            "message": "Login successful",
            "accessToken": "a1",
            "refreshToken": "r1",
            "user": { "id": "u1", "name": "Ada", "email": "ada@example.com", "role": ["USER"] }
        }))
        .unwrap();
        assert_eq!(response.access_token, "a1");
        assert_eq!(response.user.name, "Ada");
    }
}
