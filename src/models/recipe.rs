use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// How demanding a recipe is, stored lowercase in the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A single user's rating, embedded in its recipe document.
///
/// A recipe holds at most one rating per user; resubmitting replaces the
/// previous entry in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: impl Into<String>, value: f64, comment: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            value,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// Optional per-serving nutrition facts. All fields sparse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

/// The author-editable fields of a recipe.
///
/// This is both the create payload and the update whitelist: derived fields
/// (ratings, averageRating, authorship, timestamps, version) can never be
/// written through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    /// Single text blob; paragraph breaks delimit steps.
    pub instructions: String,
    /// Minutes.
    pub cooking_time: i64,
    pub servings: i64,
    pub difficulty: Difficulty,
    pub image_url: String,
    pub category: String,
    pub cuisine: String,
    #[serde(default)]
    pub dietary: Vec<String>,
    /// Serialized even when absent: an update that omits it writes null,
    /// clearing any previously stored facts.
    #[serde(default)]
    pub nutritional_info: Option<NutritionalInfo>,
}

impl RecipeInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.title.trim().is_empty() {
            return Err(ServiceError::Validation("title is required".into()));
        }
        if self.cooking_time <= 0 {
            return Err(ServiceError::Validation(
                "cookingTime must be positive".into(),
            ));
        }
        if self.servings <= 0 {
            return Err(ServiceError::Validation("servings must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cooking_time: i64,
    pub servings: i64,
    pub difficulty: Difficulty,
    pub image_url: String,
    pub category: String,
    pub cuisine: String,
    #[serde(default)]
    pub dietary: Vec<String>,
    pub author_id: String,
    pub author_name: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub ratings_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
    /// Bumped on every rating write; filters stale compare-and-swap updates.
    #[serde(default)]
    pub version: i64,
}

impl Recipe {
    /// Builds a fresh recipe from author input. Rating state starts empty.
    pub fn new(
        input: RecipeInput,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: input.title,
            description: input.description,
            ingredients: input.ingredients,
            instructions: input.instructions,
            cooking_time: input.cooking_time,
            servings: input.servings,
            difficulty: input.difficulty,
            image_url: input.image_url,
            category: input.category,
            cuisine: input.cuisine,
            dietary: input.dietary,
            author_id: author_id.into(),
            author_name: author_name.into(),
            created_at: Utc::now(),
            ratings: Vec::new(),
            average_rating: 0.0,
            ratings_count: 0,
            nutritional_info: input.nutritional_info,
            version: 0,
        }
    }

    /// Replaces this user's previous rating in place, or appends a new one,
    /// then recomputes the derived averageRating and ratingsCount.
    ///
    /// Returns `true` when an existing rating was replaced.
    pub fn upsert_rating(&mut self, rating: Rating) -> bool {
        let replaced = match self
            .ratings
            .iter_mut()
            .find(|r| r.user_id == rating.user_id)
        {
            Some(existing) => {
                *existing = rating;
                true
            }
            None => {
                self.ratings.push(rating);
                false
            }
        };

        self.average_rating = mean(&self.ratings);
        self.ratings_count = self.ratings.len() as i64;
        replaced
    }

    pub fn owned_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    /// Hex form of the document id, empty before the first insert.
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Arithmetic mean of rating values, 0 for an empty list.
fn mean(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| r.value).sum::<f64>() / ratings.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> RecipeInput {
        RecipeInput {
            title: "Shakshuka".to_string(),
            description: "Eggs poached in spiced tomato sauce".to_string(),
            ingredients: vec!["eggs".into(), "tomatoes".into(), "paprika".into()],
            instructions: "Simmer the sauce.\n\nCrack in the eggs.".to_string(),
            cooking_time: 30,
            servings: 2,
            difficulty: Difficulty::Easy,
            image_url: "https://example.com/shakshuka.jpg".to_string(),
            category: "Breakfast".to_string(),
            cuisine: "Mediterranean".to_string(),
            dietary: vec!["vegetarian".into()],
            nutritional_info: None,
        }
    }

    #[test]
    fn test_new_recipe_starts_unrated() {
        let recipe = Recipe::new(sample_input(), "user1", "Alice");

        assert_eq!(recipe.author_id, "user1");
        assert_eq!(recipe.author_name, "Alice");
        assert!(recipe.ratings.is_empty());
        assert_eq!(recipe.average_rating, 0.0);
        assert_eq!(recipe.ratings_count, 0);
        assert_eq!(recipe.version, 0);
        assert!(recipe.id.is_none());
    }

    #[test]
    fn test_upsert_rating_appends_then_replaces() {
        let mut recipe = Recipe::new(sample_input(), "author", "Alice");

        let replaced = recipe.upsert_rating(Rating::new("user2", 4.0, None));
        assert!(!replaced);
        assert_eq!(recipe.ratings.len(), 1);
        assert_eq!(recipe.average_rating, 4.0);

        // Same user again: replace in place, count unchanged
        let replaced = recipe.upsert_rating(Rating::new("user2", 2.0, Some("too salty".into())));
        assert!(replaced);
        assert_eq!(recipe.ratings.len(), 1);
        assert_eq!(recipe.average_rating, 2.0);
        assert_eq!(recipe.ratings[0].comment.as_deref(), Some("too salty"));
    }

    #[test]
    fn test_average_over_several_raters() {
        let mut recipe = Recipe::new(sample_input(), "author", "Alice");
        recipe.upsert_rating(Rating::new("a", 5.0, None));
        recipe.upsert_rating(Rating::new("b", 4.0, None));
        recipe.upsert_rating(Rating::new("c", 3.0, None));

        assert_eq!(recipe.ratings_count, 3);
        assert!((recipe.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_owned_by() {
        let recipe = Recipe::new(sample_input(), "user1", "Alice");
        assert!(recipe.owned_by("user1"));
        assert!(!recipe.owned_by("user2"));
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Medium).unwrap(),
            "\"medium\""
        );
        let parsed: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(parsed, Difficulty::Hard);
    }

    #[test]
    fn test_input_validation() {
        let mut input = sample_input();
        input.title = "  ".to_string();
        assert!(input.validate().is_err());

        let mut input = sample_input();
        input.cooking_time = 0;
        assert!(input.validate().is_err());

        assert!(sample_input().validate().is_ok());
    }

    #[test]
    fn test_input_without_nutrition_writes_null() {
        // The update path $sets the serialized input, so the key has to be
        // present even when None or stored facts could never be cleared.
        let doc = mongodb::bson::to_document(&sample_input()).unwrap();
        assert_eq!(doc.get("nutritionalInfo"), Some(&mongodb::bson::Bson::Null));

        let with_facts = RecipeInput {
            nutritional_info: Some(NutritionalInfo {
                calories: Some(320.0),
                ..Default::default()
            }),
            ..sample_input()
        };
        let doc = mongodb::bson::to_document(&with_facts).unwrap();
        assert!(doc.get_document("nutritionalInfo").is_ok());
    }

    #[test]
    fn test_recipe_bson_roundtrip() {
        let mut recipe = Recipe::new(sample_input(), "user1", "Alice");
        recipe.upsert_rating(Rating::new("user2", 5.0, Some("great".into())));

        let doc = mongodb::bson::to_document(&recipe).unwrap();
        // Wire names follow the stored document shape
        assert!(doc.contains_key("cookingTime"));
        assert!(doc.contains_key("averageRating"));
        assert!(!doc.contains_key("_id"));

        let parsed: Recipe = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(parsed.title, recipe.title);
        assert_eq!(parsed.ratings, recipe.ratings);
        assert_eq!(parsed.average_rating, 5.0);
    }
}
