//! Recipe collection access: CRUD, the browse/search query, the home-page
//! feeds, and rating submission.

use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::{Rating, Recipe, RecipeInput};

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page a client may request.
const MAX_PAGE_SIZE: u32 = 50;

/// Attempts before a rating write gives up on winning the version race.
const RATE_RETRIES: u32 = 5;

/// Fixed orderings offered by the browse page. No relevance scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Most recent first (the default).
    #[default]
    Newest,
    /// Most reviewed first.
    Popular,
    /// Highest average rating first.
    Rating,
}

/// Flat filter set from the browse/search query string.
///
/// Empty strings and zero values mean "no constraint", matching the way the
/// UI leaves filters blank.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub dietary: Option<String>,
    pub difficulty: Option<String>,
    /// Free-text search, `q` in the query string.
    #[serde(rename = "q")]
    pub search: Option<String>,
    /// Upper bound in minutes; 0 disables the constraint.
    pub cooking_time: i64,
    pub sort_by: SortBy,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            cuisine: None,
            dietary: None,
            difficulty: None,
            search: None,
            cooking_time: 0,
            sort_by: SortBy::Newest,
        }
    }
}

/// One page of browse results plus the total match count for pagination.
#[derive(Debug, Serialize)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total: u64,
}

pub struct RecipeRepository {
    coll: Collection<Recipe>,
}

impl RecipeRepository {
    pub fn new(coll: Collection<Recipe>) -> Self {
        Self { coll }
    }

    /// The browse/search listing: filters, one fixed sort, offset window.
    pub async fn list(&self, query: &RecipeQuery) -> Result<RecipePage, ServiceError> {
        let filter = build_filter(query);
        let total = self.coll.count_documents(filter.clone(), None).await?;

        let limit = effective_limit(query.limit);
        let options = FindOptions::builder()
            .sort(sort_doc(query.sort_by))
            .skip(page_skip(query.page, limit))
            .limit(limit as i64)
            .build();
        let recipes = self.coll.find(filter, options).await?.try_collect().await?;

        Ok(RecipePage { recipes, total })
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<Recipe>, ServiceError> {
        let oid = ObjectId::parse_str(id)?;
        Ok(self.coll.find_one(doc! {"_id": oid}, None).await?)
    }

    /// A user's own recipes, newest first.
    pub async fn by_author(&self, author_id: &str) -> Result<Vec<Recipe>, ServiceError> {
        let options = FindOptions::builder().sort(doc! {"createdAt": -1}).build();
        let recipes = self
            .coll
            .find(doc! {"authorId": author_id}, options)
            .await?
            .try_collect()
            .await?;
        Ok(recipes)
    }

    /// Fetches the given ids, preserving input order. Unknown or malformed
    /// ids are silently dropped: deletes do not cascade, so favorites and
    /// collections may legitimately hold dangling references.
    pub async fn by_ids(&self, ids: &[String]) -> Result<Vec<Recipe>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let oids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();
        let found: Vec<Recipe> = self
            .coll
            .find(doc! {"_id": {"$in": oids}}, None)
            .await?
            .try_collect()
            .await?;

        let mut by_hex: HashMap<String, Recipe> = found
            .into_iter()
            .map(|recipe| (recipe.id_hex(), recipe))
            .collect();
        Ok(ids.iter().filter_map(|id| by_hex.remove(id)).collect())
    }

    pub async fn create(
        &self,
        input: RecipeInput,
        author_id: &str,
        author_name: &str,
    ) -> Result<Recipe, ServiceError> {
        input.validate()?;

        let mut recipe = Recipe::new(input, author_id, author_name);
        let result = self.coll.insert_one(&recipe, None).await?;
        recipe.id = result.inserted_id.as_object_id();
        Ok(recipe)
    }

    /// Owner-only update. Only the [`RecipeInput`] whitelist is written;
    /// ratings, authorship and timestamps are untouchable through this path.
    pub async fn update(
        &self,
        id: &str,
        caller: &str,
        input: RecipeInput,
    ) -> Result<Recipe, ServiceError> {
        input.validate()?;

        let recipe = self.by_id(id).await?.ok_or(ServiceError::NotFound)?;
        if !recipe.owned_by(caller) {
            return Err(ServiceError::Forbidden);
        }

        let oid = ObjectId::parse_str(id)?;
        let changes = bson::to_document(&input)?;
        self.coll
            .update_one(doc! {"_id": oid}, doc! {"$set": changes}, None)
            .await?;

        self.by_id(id).await?.ok_or(ServiceError::NotFound)
    }

    /// Owner-only delete. No cascade: collection membership and favorites
    /// keep the id and filter it out at read time.
    pub async fn delete(&self, id: &str, caller: &str) -> Result<(), ServiceError> {
        let recipe = self.by_id(id).await?.ok_or(ServiceError::NotFound)?;
        if !recipe.owned_by(caller) {
            return Err(ServiceError::Forbidden);
        }

        let oid = ObjectId::parse_str(id)?;
        self.coll.delete_one(doc! {"_id": oid}, None).await?;
        Ok(())
    }

    /// Submits a rating: replace the caller's previous entry or append a
    /// new one, then persist the recomputed mean.
    ///
    /// The embedded-list rewrite is guarded by a compare-and-swap on the
    /// document version, so two raters racing on the same recipe cannot
    /// lose each other's writes; the loser reloads and retries.
    pub async fn rate(
        &self,
        id: &str,
        user_id: &str,
        value: f64,
        comment: Option<String>,
    ) -> Result<Recipe, ServiceError> {
        if !(1.0..=5.0).contains(&value) {
            return Err(ServiceError::Validation(
                "rating must be between 1 and 5".into(),
            ));
        }

        let oid = ObjectId::parse_str(id)?;
        for _ in 0..RATE_RETRIES {
            let mut recipe = self
                .coll
                .find_one(doc! {"_id": oid}, None)
                .await?
                .ok_or(ServiceError::NotFound)?;
            let expected = recipe.version;
            recipe.upsert_rating(Rating::new(user_id, value, comment.clone()));

            let ratings = bson::to_bson(&recipe.ratings)?;
            let result = self
                .coll
                .update_one(
                    doc! {"_id": oid, "version": version_guard(expected)},
                    doc! {"$set": {
                        "ratings": ratings,
                        "averageRating": recipe.average_rating,
                        "ratingsCount": recipe.ratings_count,
                        "version": expected + 1,
                    }},
                    None,
                )
                .await?;

            if result.matched_count == 1 {
                recipe.version = expected + 1;
                return Ok(recipe);
            }
            // Lost the race; reload and try again.
        }

        Err(ServiceError::Conflict)
    }

    /// Newly added recipes for the home page.
    pub async fn newest(&self, limit: i64) -> Result<Vec<Recipe>, ServiceError> {
        self.feed(doc! {}, doc! {"createdAt": -1}, limit).await
    }

    /// Highest-rated recipes.
    pub async fn popular(&self, limit: i64) -> Result<Vec<Recipe>, ServiceError> {
        self.feed(doc! {}, doc! {"averageRating": -1}, limit).await
    }

    /// Recipes with at least four ratings, best first; topped up with the
    /// overall highest-rated when there are too few reviewed ones.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Recipe>, ServiceError> {
        let mut recipes = self
            .feed(doc! {"ratings.3": {"$exists": true}}, doc! {"averageRating": -1}, limit)
            .await?;

        if (recipes.len() as i64) < limit {
            let have: Vec<ObjectId> = recipes.iter().filter_map(|r| r.id).collect();
            let more = self
                .feed(
                    doc! {"_id": {"$nin": have}},
                    doc! {"averageRating": -1},
                    limit - recipes.len() as i64,
                )
                .await?;
            recipes.extend(more);
        }

        Ok(recipes)
    }

    /// Recipes sharing a category, cuisine or difficulty with the given one.
    pub async fn similar_to(&self, id: &str, limit: i64) -> Result<Vec<Recipe>, ServiceError> {
        let current = self.by_id(id).await?.ok_or(ServiceError::NotFound)?;
        let oid = ObjectId::parse_str(id)?;

        let filter = doc! {
            "_id": {"$ne": oid},
            "$or": [
                {"category": current.category.clone()},
                {"cuisine": current.cuisine.clone()},
                {"difficulty": current.difficulty.as_str()},
            ],
        };
        self.feed(filter, doc! {"averageRating": -1}, limit).await
    }

    /// Best recipes carrying a dietary tag.
    pub async fn by_dietary(&self, dietary: &str, limit: i64) -> Result<Vec<Recipe>, ServiceError> {
        self.feed(doc! {"dietary": dietary}, doc! {"averageRating": -1}, limit)
            .await
    }

    /// The quick-and-easy explore view: at most 30 minutes, best first.
    pub async fn quick_easy(&self, limit: i64) -> Result<Vec<Recipe>, ServiceError> {
        self.feed(
            doc! {"cookingTime": {"$lte": 30}},
            doc! {"averageRating": -1},
            limit,
        )
        .await
    }

    async fn feed(
        &self,
        filter: Document,
        sort: Document,
        limit: i64,
    ) -> Result<Vec<Recipe>, ServiceError> {
        let options = FindOptions::builder().sort(sort).limit(limit).build();
        let recipes = self.coll.find(filter, options).await?.try_collect().await?;
        Ok(recipes)
    }
}

/// Translates the flat filter set into one query document. Each non-empty
/// scalar becomes an equality constraint; free text becomes a
/// case-insensitive substring match on title, description or any
/// ingredient; cookingTime only constrains when positive.
fn build_filter(query: &RecipeQuery) -> Document {
    let mut filter = Document::new();

    if let Some(category) = non_empty(&query.category) {
        filter.insert("category", category);
    }
    if let Some(cuisine) = non_empty(&query.cuisine) {
        filter.insert("cuisine", cuisine);
    }
    if let Some(dietary) = non_empty(&query.dietary) {
        filter.insert("dietary", dietary);
    }
    if let Some(difficulty) = non_empty(&query.difficulty) {
        filter.insert("difficulty", difficulty);
    }
    if query.cooking_time > 0 {
        filter.insert("cookingTime", doc! {"$lte": query.cooking_time});
    }
    if let Some(search) = non_empty(&query.search) {
        // User input is a substring, not a pattern.
        let pattern = escape_regex(search);
        filter.insert(
            "$or",
            vec![
                doc! {"title": {"$regex": &pattern, "$options": "i"}},
                doc! {"description": {"$regex": &pattern, "$options": "i"}},
                doc! {"ingredients": {"$elemMatch": {"$regex": &pattern, "$options": "i"}}},
            ],
        );
    }

    filter
}

fn sort_doc(sort_by: SortBy) -> Document {
    match sort_by {
        SortBy::Newest => doc! {"createdAt": -1},
        SortBy::Popular => doc! {"ratingsCount": -1},
        SortBy::Rating => doc! {"averageRating": -1},
    }
}

/// Page size actually sent to the driver. A zero limit would mean
/// "unlimited" to MongoDB, so it falls back to the default page size, and
/// oversized requests are capped.
fn effective_limit(limit: u32) -> u32 {
    if limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        limit.min(MAX_PAGE_SIZE)
    }
}

/// Offset of the first result on `page` (1-based).
fn page_skip(page: u32, limit: u32) -> u64 {
    (page.max(1) as u64 - 1) * limit as u64
}

/// Version filter for the rating compare-and-swap. Documents written before
/// versioning have no field at all, which MongoDB matches against null.
fn version_guard(expected: i64) -> Bson {
    if expected == 0 {
        Bson::from(doc! {"$in": [0i64, Bson::Null]})
    } else {
        Bson::from(expected)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_builds_empty_filter() {
        let filter = build_filter(&RecipeQuery::default());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_scalar_filters_are_equality_constraints() {
        let query = RecipeQuery {
            category: Some("Dinner".into()),
            cuisine: Some("Italian".into()),
            ..Default::default()
        };
        let filter = build_filter(&query);

        // Both constraints land in one document: the intersection.
        assert_eq!(filter.get_str("category").unwrap(), "Dinner");
        assert_eq!(filter.get_str("cuisine").unwrap(), "Italian");
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = RecipeQuery {
            category: Some("  ".into()),
            difficulty: Some(String::new()),
            ..Default::default()
        };
        assert!(build_filter(&query).is_empty());
    }

    #[test]
    fn test_cooking_time_zero_means_unconstrained() {
        let query = RecipeQuery {
            cooking_time: 0,
            ..Default::default()
        };
        assert!(build_filter(&query).is_empty());

        let query = RecipeQuery {
            cooking_time: 30,
            ..Default::default()
        };
        let filter = build_filter(&query);
        assert_eq!(
            filter.get_document("cookingTime").unwrap(),
            &doc! {"$lte": 30i64}
        );
    }

    #[test]
    fn test_search_spans_title_description_ingredients() {
        let query = RecipeQuery {
            search: Some("garlic".into()),
            ..Default::default()
        };
        let filter = build_filter(&query);

        let or = filter.get_array("$or").unwrap();
        assert_eq!(or.len(), 3);
        let title = or[0].as_document().unwrap();
        assert_eq!(
            title.get_document("title").unwrap(),
            &doc! {"$regex": "garlic", "$options": "i"}
        );
        let ingredients = or[2].as_document().unwrap();
        assert!(ingredients
            .get_document("ingredients")
            .unwrap()
            .contains_key("$elemMatch"));
    }

    #[test]
    fn test_search_input_is_escaped() {
        let query = RecipeQuery {
            search: Some("mac (and) cheese?".into()),
            ..Default::default()
        };
        let filter = build_filter(&query);
        let or = filter.get_array("$or").unwrap();
        let pattern = or[0]
            .as_document()
            .unwrap()
            .get_document("title")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(pattern, r"mac \(and\) cheese\?");
    }

    #[test]
    fn test_escape_regex_leaves_plain_text_alone() {
        assert_eq!(escape_regex("chicken soup"), "chicken soup");
        assert_eq!(escape_regex("a.b"), r"a\.b");
    }

    #[test]
    fn test_sort_orders() {
        assert_eq!(sort_doc(SortBy::Newest), doc! {"createdAt": -1});
        assert_eq!(sort_doc(SortBy::Popular), doc! {"ratingsCount": -1});
        assert_eq!(sort_doc(SortBy::Rating), doc! {"averageRating": -1});
    }

    #[test]
    fn test_limit_is_clamped() {
        // A zero limit is MongoDB's "unlimited" sentinel; it must never
        // reach the driver, or one request pages through every recipe.
        assert_eq!(effective_limit(0), DEFAULT_PAGE_SIZE);
        assert_eq!(effective_limit(10_000), MAX_PAGE_SIZE);
        // In-range values pass through
        assert_eq!(effective_limit(1), 1);
        assert_eq!(effective_limit(DEFAULT_PAGE_SIZE), DEFAULT_PAGE_SIZE);
        assert_eq!(effective_limit(MAX_PAGE_SIZE), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_skip_window() {
        // Page 2 with limit 12 starts at offset 12, so a 20-recipe result
        // set yields recipes 13..=20.
        assert_eq!(page_skip(1, 12), 0);
        assert_eq!(page_skip(2, 12), 12);
        assert_eq!(page_skip(3, 5), 10);
        // Page 0 is clamped rather than underflowing.
        assert_eq!(page_skip(0, 12), 0);
    }

    #[test]
    fn test_version_guard_tolerates_missing_field() {
        // Pre-versioning documents have no field; Mongo matches missing
        // fields against null.
        assert_eq!(
            version_guard(0),
            Bson::from(doc! {"$in": [0i64, Bson::Null]})
        );
        assert_eq!(version_guard(3), Bson::from(3i64));
    }

    #[test]
    fn test_query_deserializes_from_query_string_names() {
        let query: RecipeQuery = serde_json::from_str(
            r#"{"q": "soup", "sortBy": "rating", "cookingTime": 45, "page": 2}"#,
        )
        .unwrap();
        assert_eq!(query.search.as_deref(), Some("soup"));
        assert_eq!(query.sort_by, SortBy::Rating);
        assert_eq!(query.cooking_time, 45);
        assert_eq!(query.page, 2);
        // Defaults fill the rest
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    }
}
