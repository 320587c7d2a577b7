use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub const NAMES: &'static [&'static str] = &["user", "admin"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user row. Not serializable: responses go through [`UserView`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub role: Role,
    /// argon2 PHC string
    pub password: String,
}

/// Read projection of a user without the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub user_id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Registration payload. `role` is never read from the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostUser {
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    #[serde(skip_deserializing)]
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PutUser {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn view_drops_password() {
        let user = User {
            user_id: 1,
            user_name: "a".to_string(),
            email: None,
            role: Role::Admin,
            password: "$argon2id$...".to_string(),
        };
        let body = serde_json::to_value(UserView::from(user)).unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["role"], "admin");
    }

    #[test]
    fn registration_ignores_client_role() {
        let post: PostUser = serde_json::from_value(
            json!({ "user_name": "a", "password": "p", "role": "admin" }),
        )
        .unwrap();
        assert_eq!(post.role, Role::User);
    }

    #[test]
    fn role_round_trips_through_str() {
        for name in Role::NAMES {
            assert_eq!(name.parse::<Role>().unwrap().as_str(), *name);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
