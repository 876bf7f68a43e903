//! Category and cuisine reference data.
//!
//! Both collections are small, mostly static, and seeded once on first
//! startup. The only later mutation is the placeholder-image upgrade, which
//! rewrites documents still pointing at the bundled placeholder asset.

use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::error::ServiceError;
use crate::models::Taxon;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaxonKind {
    Categories,
    Cuisines,
}

pub struct TaxonomyRepository {
    coll: Collection<Taxon>,
    kind: TaxonKind,
}

impl TaxonomyRepository {
    pub fn categories(coll: Collection<Taxon>) -> Self {
        Self {
            coll,
            kind: TaxonKind::Categories,
        }
    }

    pub fn cuisines(coll: Collection<Taxon>) -> Self {
        Self {
            coll,
            kind: TaxonKind::Cuisines,
        }
    }

    /// All entries sorted by display name.
    pub async fn list(&self) -> Result<Vec<Taxon>, ServiceError> {
        let options = FindOptions::builder().sort(doc! {"name": 1}).build();
        let taxa = self.coll.find(doc! {}, options).await?.try_collect().await?;
        Ok(taxa)
    }

    pub async fn by_slug(&self, slug: &str) -> Result<Option<Taxon>, ServiceError> {
        Ok(self.coll.find_one(doc! {"slug": slug}, None).await?)
    }

    /// Inserts the default entries, but only into an empty collection.
    /// Calling this twice never duplicates documents.
    pub async fn seed_if_empty(&self) -> Result<(), ServiceError> {
        let count = self.coll.count_documents(doc! {}, None).await?;
        if count == 0 {
            let seed = match self.kind {
                TaxonKind::Categories => default_categories(),
                TaxonKind::Cuisines => default_cuisines(),
            };
            tracing::info!("seeding {} reference document(s)", seed.len());
            self.coll.insert_many(seed, None).await?;
        }
        Ok(())
    }

    /// Rewrites any document whose image still matches the placeholder
    /// pattern to the curated image for its slug. Slugs without a curated
    /// image are left alone.
    pub async fn upgrade_placeholder_images(&self) -> Result<(), ServiceError> {
        let stale: Vec<Taxon> = self
            .coll
            .find(placeholder_filter(), None)
            .await?
            .try_collect()
            .await?;

        for taxon in stale {
            let curated = match self.kind {
                TaxonKind::Categories => curated_category_image(&taxon.slug),
                TaxonKind::Cuisines => curated_cuisine_image(&taxon.slug),
            };
            if let (Some(id), Some(image_url)) = (taxon.id, curated) {
                self.coll
                    .update_one(
                        doc! {"_id": id},
                        doc! {"$set": {"imageUrl": image_url}},
                        None,
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

fn placeholder_filter() -> Document {
    doc! {"imageUrl": {"$regex": "/placeholder.svg"}}
}

fn unsplash(photo: &str, query: &str) -> String {
    format!(
        "https://images.unsplash.com/{photo}?w=800&auto=format&fit=crop&q=60&ixlib=rb-4.0.3&ixid={query}"
    )
}

pub(crate) fn default_categories() -> Vec<Taxon> {
    vec![
        Taxon::new(
            "Breakfast",
            "breakfast",
            "Start your day with these delicious breakfast recipes",
            unsplash(
                "photo-1533089860892-a9b9ac6cd6a4",
                "M3wxMjA3fDB8MHxzZWFyY2h8M3x8YnJlYWtmYXN0fGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Lunch",
            "lunch",
            "Perfect meals for your midday break",
            unsplash(
                "photo-1547496502-affa22d38842",
                "M3wxMjA3fDB8MHxzZWFyY2h8MTZ8fGx1bmNofGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Dinner",
            "dinner",
            "Hearty and satisfying dinner recipes for the whole family",
            unsplash(
                "photo-1576402187878-974f70c890a5",
                "M3wxMjA3fDB8MHxzZWFyY2h8MTJ8fGRpbm5lcnxlbnwwfHwwfHx8MA%3D%3D",
            ),
        ),
        Taxon::new(
            "Desserts",
            "desserts",
            "Sweet treats to satisfy your cravings",
            unsplash(
                "photo-1563729784474-d77dbb933a9e",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8ZGVzc2VydHN8ZW58MHx8MHx8fDA%3D",
            ),
        ),
        Taxon::new(
            "Snacks",
            "snacks",
            "Quick and easy snack ideas",
            unsplash(
                "photo-1621939514649-280e2ee25f60",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8c25hY2tzfGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Drinks",
            "drinks",
            "Refreshing beverages for any occasion",
            unsplash(
                "photo-1544145945-f90425340c7e",
                "M3wxMjA3fDB8MHxzZWFyY2h8M3x8ZHJpbmtzfGVufDB8fDB8fHww",
            ),
        ),
    ]
}

pub(crate) fn default_cuisines() -> Vec<Taxon> {
    vec![
        Taxon::new(
            "Italian",
            "italian",
            "Classic Italian dishes from pasta to pizza",
            unsplash(
                "photo-1595295333158-4742f28fbd85",
                "M3wxMjA3fDB8MHxzZWFyY2h8MTB8fGl0YWxpYW4lMjBmb29kfGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Indian",
            "indian",
            "Flavorful and spicy Indian cuisine",
            unsplash(
                "photo-1585937421612-70a008356fbe",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8aW5kaWFuJTIwZm9vZHxlbnwwfHwwfHx8MA%3D%3D",
            ),
        ),
        Taxon::new(
            "Mexican",
            "mexican",
            "Vibrant and bold Mexican flavors",
            unsplash(
                "photo-1613514785940-daed07799d9b",
                "M3wxMjA3fDB8MHxzZWFyY2h8Nnx8bWV4aWNhbiUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
            ),
        ),
        Taxon::new(
            "Chinese",
            "chinese",
            "Traditional and modern Chinese recipes",
            unsplash(
                "photo-1563245372-f21724e3856d",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8Y2hpbmVzZSUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
            ),
        ),
        Taxon::new(
            "Japanese",
            "japanese",
            "Elegant and precise Japanese cooking",
            unsplash(
                "photo-1611143669185-af224c5e3252",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8amFwYW5lc2UlMjBmb29kfGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Mediterranean",
            "mediterranean",
            "Healthy and flavorful Mediterranean dishes",
            unsplash(
                "photo-1594007654729-407eedc4fe0f",
                "M3wxMjA3fDB8MHxzZWFyY2h8M3x8bWVkaXRlcnJhbmVhbiUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
            ),
        ),
        Taxon::new(
            "American",
            "american",
            "Classic American comfort food",
            unsplash(
                "photo-1551782450-17144efb9c50",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8YnVyZ2VyfGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Thai",
            "thai",
            "Aromatic and spicy Thai cuisine",
            unsplash(
                "photo-1562565652-a0d8f0c59eb4",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8dGhhaSUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
            ),
        ),
        Taxon::new(
            "French",
            "french",
            "Sophisticated and elegant French cuisine",
            unsplash(
                "photo-1608855238293-a8853e7f7c98",
                "M3wxMjA3fDB8MHxzZWFyY2h8M3x8ZnJlbmNoJTIwZm9vZHxlbnwwfHwwfHx8MA%3D%3D",
            ),
        ),
        Taxon::new(
            "Spanish",
            "spanish",
            "Flavorful Spanish dishes including tapas and paella",
            unsplash(
                "photo-1515443961218-a51367888e4b",
                "M3wxMjA3fDB8MHxzZWFyY2h8M3x8c3BhbmlzaCUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
            ),
        ),
        Taxon::new(
            "Greek",
            "greek",
            "Fresh and healthy Greek cuisine",
            unsplash(
                "photo-1600335895229-6e75511892c8",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8Z3JlZWslMjBmb29kfGVufDB8fDB8fHww",
            ),
        ),
        Taxon::new(
            "Korean",
            "korean",
            "Bold and flavorful Korean dishes",
            unsplash(
                "photo-1590301157890-4810ed352733",
                "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8a29yZWFuJTIwZm9vZHxlbnwwfHwwfHx8MA%3D%3D",
            ),
        ),
    ]
}

fn curated_category_image(slug: &str) -> Option<String> {
    default_categories()
        .into_iter()
        .find(|taxon| taxon.slug == slug)
        .map(|taxon| taxon.image_url)
}

/// Curated cuisine images cover a few slugs beyond the seeded set so that
/// hand-added cuisines get upgraded too.
fn curated_cuisine_image(slug: &str) -> Option<String> {
    if let Some(seeded) = default_cuisines()
        .into_iter()
        .find(|taxon| taxon.slug == slug)
    {
        return Some(seeded.image_url);
    }

    match slug {
        "vietnamese" => Some(unsplash(
            "photo-1511910849309-0dffb8785146",
            "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8dmlldG5hbWVzZSUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
        )),
        "middle_eastern" => Some(unsplash(
            "photo-1541518763669-27fef04b14ea",
            "M3wxMjA3fDB8MHxzZWFyY2h8M3x8bWlkZGxlJTIwZWFzdGVybiUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
        )),
        "caribbean" => Some(unsplash(
            "photo-1544378375-c4d3f5d01fb4",
            "M3wxMjA3fDB8MHxzZWFyY2h8Mnx8Y2FyaWJiZWFuJTIwZm9vZHxlbnwwfHwwfHx8MA%3D%3D",
        )),
        "african" => Some(unsplash(
            "photo-1604329760661-e71dc83f8f26",
            "M3wxMjA3fDB8MHxzZWFyY2h8M3x8YWZyaWNhbiUyMGZvb2R8ZW58MHx8MHx8fDA%3D",
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_category_seed_slugs_unique() {
        let categories = default_categories();
        let slugs: HashSet<&str> = categories.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs.len(), categories.len());
        assert_eq!(categories.len(), 6);
    }

    #[test]
    fn test_cuisine_seed_slugs_unique() {
        let cuisines = default_cuisines();
        let slugs: HashSet<&str> = cuisines.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs.len(), cuisines.len());
        assert_eq!(cuisines.len(), 12);
    }

    #[test]
    fn test_seed_entries_carry_real_images() {
        for taxon in default_categories().iter().chain(default_cuisines().iter()) {
            assert!(taxon.image_url.starts_with("https://"), "{}", taxon.slug);
            assert!(!taxon.description.is_empty());
        }
    }

    #[test]
    fn test_curated_image_lookup() {
        // Seeded slugs resolve to their seed image
        assert_eq!(
            curated_category_image("dinner"),
            Some(
                default_categories()
                    .into_iter()
                    .find(|c| c.slug == "dinner")
                    .unwrap()
                    .image_url
            )
        );
        // Curated extras beyond the cuisine seed set
        assert!(curated_cuisine_image("vietnamese").is_some());
        assert!(curated_cuisine_image("caribbean").is_some());
        // Unknown slugs stay untouched
        assert!(curated_category_image("midnight-snack").is_none());
        assert!(curated_cuisine_image("martian").is_none());
    }

    #[test]
    fn test_placeholder_filter_matches_on_image_url() {
        assert_eq!(
            placeholder_filter(),
            doc! {"imageUrl": {"$regex": "/placeholder.svg"}}
        );
    }
}
