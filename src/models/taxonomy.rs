use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Reference-data entry shared by the `categories` and `cuisines`
/// collections: a display name plus a stable URL slug.
///
/// Slugs are unique and immutable once seeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Taxon {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
}

impl Taxon {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: slug.into(),
            description: description.into(),
            image_url: image_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxon_wire_shape() {
        let taxon = Taxon::new("Dinner", "dinner", "Hearty evening meals", "https://img/d.jpg");
        let doc = mongodb::bson::to_document(&taxon).unwrap();
        assert!(doc.contains_key("imageUrl"));
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("slug").unwrap(), "dinner");
    }
}
