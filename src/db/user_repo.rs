//! User accounts and the favorites set.

use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;

use crate::error::ServiceError;
use crate::models::User;

pub struct UserRepository {
    coll: Collection<User>,
}

impl UserRepository {
    pub fn new(coll: Collection<User>) -> Self {
        Self { coll }
    }

    /// Registers a new account. The email must not already exist; the
    /// password arrives pre-hashed.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<User, ServiceError> {
        if self.by_email(email).await?.is_some() {
            return Err(ServiceError::Validation(
                "email is already registered".into(),
            ));
        }

        let mut user = User::new(name, email, password_hash);
        let result = self.coll.insert_one(&user, None).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    pub async fn by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.coll.find_one(doc! {"email": email}, None).await?)
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        let oid = ObjectId::parse_str(id)?;
        Ok(self.coll.find_one(doc! {"_id": oid}, None).await?)
    }

    /// Adds a recipe to the favorites set. $addToSet keeps the list
    /// duplicate-free even when the same recipe is added twice.
    pub async fn add_favorite(&self, user_id: &str, recipe_id: &str) -> Result<(), ServiceError> {
        let oid = ObjectId::parse_str(user_id)?;
        let result = self
            .coll
            .update_one(doc! {"_id": oid}, add_favorite_update(recipe_id), None)
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }

    pub async fn remove_favorite(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<(), ServiceError> {
        let oid = ObjectId::parse_str(user_id)?;
        let result = self
            .coll
            .update_one(doc! {"_id": oid}, remove_favorite_update(recipe_id), None)
            .await?;
        if result.matched_count == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }

    /// The raw favorite ids in stored order. May contain ids of recipes
    /// deleted since; readers resolve them through
    /// `RecipeRepository::by_ids`, which drops the dangling ones.
    pub async fn favorite_ids(&self, user_id: &str) -> Result<Vec<String>, ServiceError> {
        let user = self.by_id(user_id).await?.ok_or(ServiceError::NotFound)?;
        Ok(user.favorites)
    }
}

fn add_favorite_update(recipe_id: &str) -> Document {
    doc! {"$addToSet": {"favorites": recipe_id}}
}

fn remove_favorite_update(recipe_id: &str) -> Document {
    doc! {"$pull": {"favorites": recipe_id}}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_favorite_uses_set_semantics() {
        // $addToSet is what makes a double-add a no-op server-side.
        assert_eq!(
            add_favorite_update("abc"),
            doc! {"$addToSet": {"favorites": "abc"}}
        );
    }

    #[test]
    fn test_remove_favorite_pulls_the_id() {
        assert_eq!(
            remove_favorite_update("abc"),
            doc! {"$pull": {"favorites": "abc"}}
        );
    }
}
