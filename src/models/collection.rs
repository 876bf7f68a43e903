use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// A user-curated set of recipes.
///
/// Membership is a set of recipe id strings; order is irrelevant and
/// duplicates are suppressed by the storage layer's $addToSet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCollection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub recipe_ids: Vec<String>,
    pub user_id: String,
    pub is_public: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RecipeCollection {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        is_public: bool,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            recipe_ids: Vec::new(),
            user_id: user_id.into(),
            is_public,
            created_at: Utc::now(),
        }
    }

    pub fn owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collection_is_empty() {
        let collection = RecipeCollection::new("Weeknight dinners", None, true, "user1");
        assert!(collection.recipe_ids.is_empty());
        assert!(collection.is_public);
        assert!(collection.description.is_none());
    }

    #[test]
    fn test_owned_by() {
        let collection = RecipeCollection::new("Brunch", None, false, "user1");
        assert!(collection.owned_by("user1"));
        assert!(!collection.owned_by("someone-else"));
    }

    #[test]
    fn test_wire_field_names() {
        let collection = RecipeCollection::new(
            "Desserts",
            Some("Sweet things".to_string()),
            true,
            "user1",
        );
        let doc = mongodb::bson::to_document(&collection).unwrap();
        assert!(doc.contains_key("recipeIds"));
        assert!(doc.contains_key("isPublic"));
        assert!(doc.contains_key("userId"));
    }
}
