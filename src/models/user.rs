use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// Stored user document, including the password hash.
///
/// Never serialized to clients directly; API responses use [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// argon2 PHC string.
    pub password: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Favorite recipe ids, set semantics enforced by $addToSet.
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password: password_hash.into(),
            created_at: Utc::now(),
            favorites: Vec::new(),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Client-facing view of a user, without credentials.
///
/// Lives only in API responses, so the timestamp serializes as RFC 3339
/// rather than a BSON date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub favorites: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id_hex(),
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            favorites: user.favorites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_no_favorites() {
        let user = User::new("Alice", "alice@example.com", "$argon2id$...");
        assert!(user.favorites.is_empty());
        assert!(user.id.is_none());
        assert_eq!(user.id_hex(), "");
    }

    #[test]
    fn test_profile_drops_password() {
        let mut user = User::new("Alice", "alice@example.com", "$argon2id$secret-hash");
        user.id = Some(ObjectId::new());
        user.favorites.push("abc123".to_string());

        let profile = UserProfile::from(user.clone());
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.id, user.id_hex());
        assert_eq!(profile.favorites, vec!["abc123"]);

        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password"));
    }
}
