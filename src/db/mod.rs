mod collection_repo;
mod recipe_repo;
mod taxonomy_repo;
mod user_repo;

pub use collection_repo::{CollectionRepository, CollectionUpdate};
pub use recipe_repo::{RecipePage, RecipeQuery, RecipeRepository, SortBy, DEFAULT_PAGE_SIZE};
pub use taxonomy_repo::TaxonomyRepository;
pub use user_repo::UserRepository;

use mongodb::{Client, Database};

use crate::error::ServiceError;

/// Shared handle to the document store.
///
/// Wraps one `mongodb::Client` (which pools connections internally); clones
/// are cheap, and every repository gets its collection from here instead of
/// reaching for process-global state.
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    /// Open the shared client and select the application database.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            db: client.database(database),
        })
    }

    pub fn recipes(&self) -> RecipeRepository {
        RecipeRepository::new(self.db.collection("recipes"))
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.collection("users"))
    }

    pub fn collections(&self) -> CollectionRepository {
        CollectionRepository::new(self.db.collection("collections"))
    }

    pub fn categories(&self) -> TaxonomyRepository {
        TaxonomyRepository::categories(self.db.collection("categories"))
    }

    pub fn cuisines(&self) -> TaxonomyRepository {
        TaxonomyRepository::cuisines(self.db.collection("cuisines"))
    }

    /// Seed reference data and upgrade placeholder imagery.
    ///
    /// Safe to run on every startup: seeding only writes when the target
    /// collection is empty, and the image upgrade only touches documents
    /// still pointing at the placeholder asset.
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        self.categories().seed_if_empty().await?;
        self.cuisines().seed_if_empty().await?;
        self.categories().upgrade_placeholder_images().await?;
        self.cuisines().upgrade_placeholder_images().await?;
        Ok(())
    }
}
