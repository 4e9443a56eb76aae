//! User directory abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A user known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Provider-assigned identifier (e.g. `auth0|abc123`).
    pub user_id: String,
    /// Primary email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl DirectoryUser {
    /// Create a user with just an id and email.
    #[must_use]
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: Some(email.into()),
            name: None,
            picture: None,
            nickname: None,
        }
    }
}

/// Source of the users records can be assigned to.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    async fn list_users(&self) -> Result<Vec<DirectoryUser>>;
}

/// A fixed list of users.
///
/// Serves local runs without identity provider credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<DirectoryUser>,
}

impl StaticDirectory {
    /// Create a directory holding `users`.
    #[must_use]
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        Self { users }
    }

    /// Create a directory with no users.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>> {
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn static_directory_lists_users() {
        let directory = StaticDirectory::new(vec![DirectoryUser::new("auth0|1", "alice@x.com")]);
        let users = directory.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email.as_deref(), Some("alice@x.com"));

        assert!(StaticDirectory::empty().list_users().await.unwrap().is_empty());
    }

    #[test]
    fn user_ignores_unknown_fields() {
        let user: DirectoryUser = serde_json::from_value(json!({
            "user_id": "auth0|1",
            "email": "alice@x.com",
            "logins_count": 4,
            "identities": []
        }))
        .unwrap();
        assert_eq!(user.user_id, "auth0|1");
        assert_eq!(user.name, None);

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value, json!({"user_id": "auth0|1", "email": "alice@x.com"}));
    }
}
