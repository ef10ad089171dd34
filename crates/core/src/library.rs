//! Library catalog records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub location: String,

    /// Raw flag from the catalog; see [`Book::is_available`].
    pub available: bool,
    pub available_copies: u32,
    pub publish_year: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

impl Book {
    /// A book can be borrowed only when flagged available AND a copy is on
    /// the shelf. The catalog does not keep the two fields consistent.
    pub fn is_available(&self) -> bool {
        self.available && self.available_copies > 0
    }

    /// Case-insensitive substring match on title, author, description,
    /// category or any tag.
    pub fn mentions(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.author.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self.category.to_lowercase().contains(needle_lower)
            || self.has_tag_containing(needle_lower)
    }

    pub fn has_tag_containing(&self, needle_lower: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle_lower))
    }
}

/// A curated reading list. Book ids may dangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub category: String,
    pub description: String,
    pub books: Vec<String>,
}

/// A reading list with its ids resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecommendation {
    pub category: String,
    pub description: String,
    pub books: Vec<Book>,
}
