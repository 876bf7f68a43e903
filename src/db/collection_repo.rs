//! Recipe collection (the user-curated kind) storage.

use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::RecipeCollection;

/// Patch payload for collection metadata. Membership changes go through
/// [`CollectionRepository::add_recipe`] / [`remove_recipe`] instead.
///
/// [`remove_recipe`]: CollectionRepository::remove_recipe
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl CollectionUpdate {
    fn changes(&self) -> Document {
        let mut changes = Document::new();
        if let Some(name) = &self.name {
            changes.insert("name", name);
        }
        if let Some(description) = &self.description {
            changes.insert("description", description);
        }
        if let Some(is_public) = self.is_public {
            changes.insert("isPublic", is_public);
        }
        changes
    }
}

pub struct CollectionRepository {
    coll: Collection<RecipeCollection>,
}

impl CollectionRepository {
    pub fn new(coll: Collection<RecipeCollection>) -> Self {
        Self { coll }
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
        is_public: bool,
        user_id: &str,
    ) -> Result<RecipeCollection, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }

        let mut collection = RecipeCollection::new(name.trim(), description, is_public, user_id);
        let result = self.coll.insert_one(&collection, None).await?;
        collection.id = result.inserted_id.as_object_id();
        Ok(collection)
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<RecipeCollection>, ServiceError> {
        let oid = ObjectId::parse_str(id)?;
        Ok(self.coll.find_one(doc! {"_id": oid}, None).await?)
    }

    /// A user's collections, newest first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<RecipeCollection>, ServiceError> {
        let options = FindOptions::builder().sort(doc! {"createdAt": -1}).build();
        let collections = self
            .coll
            .find(doc! {"userId": user_id}, options)
            .await?
            .try_collect()
            .await?;
        Ok(collections)
    }

    /// Publicly shared collections, newest first.
    pub async fn public(&self, limit: i64) -> Result<Vec<RecipeCollection>, ServiceError> {
        let options = FindOptions::builder()
            .sort(doc! {"createdAt": -1})
            .limit(limit)
            .build();
        let collections = self
            .coll
            .find(doc! {"isPublic": true}, options)
            .await?
            .try_collect()
            .await?;
        Ok(collections)
    }

    /// Owner-only metadata update.
    pub async fn update(
        &self,
        id: &str,
        caller: &str,
        patch: CollectionUpdate,
    ) -> Result<RecipeCollection, ServiceError> {
        let existing = self.owned(id, caller).await?;

        let changes = patch.changes();
        if changes.is_empty() {
            // Nothing to write; an empty $set is a server error.
            return Ok(existing);
        }

        let oid = ObjectId::parse_str(id)?;
        self.coll
            .update_one(doc! {"_id": oid}, doc! {"$set": changes}, None)
            .await?;
        self.by_id(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn delete(&self, id: &str, caller: &str) -> Result<(), ServiceError> {
        self.owned(id, caller).await?;

        let oid = ObjectId::parse_str(id)?;
        self.coll.delete_one(doc! {"_id": oid}, None).await?;
        Ok(())
    }

    /// Adds a recipe id to the membership set; duplicates are suppressed by
    /// $addToSet, so adding twice leaves a single entry.
    pub async fn add_recipe(
        &self,
        id: &str,
        caller: &str,
        recipe_id: &str,
    ) -> Result<(), ServiceError> {
        self.owned(id, caller).await?;

        let oid = ObjectId::parse_str(id)?;
        self.coll
            .update_one(doc! {"_id": oid}, add_recipe_update(recipe_id), None)
            .await?;
        Ok(())
    }

    pub async fn remove_recipe(
        &self,
        id: &str,
        caller: &str,
        recipe_id: &str,
    ) -> Result<(), ServiceError> {
        self.owned(id, caller).await?;

        let oid = ObjectId::parse_str(id)?;
        self.coll
            .update_one(doc! {"_id": oid}, remove_recipe_update(recipe_id), None)
            .await?;
        Ok(())
    }

    /// Fetches a collection and verifies the caller owns it.
    async fn owned(&self, id: &str, caller: &str) -> Result<RecipeCollection, ServiceError> {
        let collection = self.by_id(id).await?.ok_or(ServiceError::NotFound)?;
        if !collection.owned_by(caller) {
            return Err(ServiceError::Forbidden);
        }
        Ok(collection)
    }
}

fn add_recipe_update(recipe_id: &str) -> Document {
    doc! {"$addToSet": {"recipeIds": recipe_id}}
}

fn remove_recipe_update(recipe_id: &str) -> Document {
    doc! {"$pull": {"recipeIds": recipe_id}}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_updates_use_set_operators() {
        assert_eq!(
            add_recipe_update("r1"),
            doc! {"$addToSet": {"recipeIds": "r1"}}
        );
        assert_eq!(remove_recipe_update("r1"), doc! {"$pull": {"recipeIds": "r1"}});
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = CollectionUpdate {
            name: Some("Renamed".into()),
            description: None,
            is_public: Some(false),
        };
        let changes = patch.changes();
        assert_eq!(changes.get_str("name").unwrap(), "Renamed");
        assert!(!changes.contains_key("description"));
        assert_eq!(changes.get_bool("isPublic").unwrap(), false);
    }

    #[test]
    fn test_empty_patch_builds_empty_document() {
        assert!(CollectionUpdate::default().changes().is_empty());
    }
}
