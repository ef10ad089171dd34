//! Book search, relevance scoring and reading-list resolution.
//!
//! "Available" always means [`Book::is_available`]: the flag AND at least one
//! copy on the shelf.

use serde::{Deserialize, Serialize};
use sunbae_core::{Book, RecommendationSet, ResolvedRecommendation};

use crate::store::DatasetStore;

/// Cap for the scored (filtered) search path.
pub const SCORED_LIMIT: usize = 20;

/// Cap for books spliced into a chat turn.
pub const CHAT_LIMIT: usize = 5;

/// Default `limit` for listing endpoints.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Books kept from a resolved reading list.
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Reading list used when no hint is given or none matches.
pub const FALLBACK_RECOMMENDATION: &str = "신입생";

const TITLE_WEIGHT: u32 = 3;
const AUTHOR_WEIGHT: u32 = 2;
const DESCRIPTION_WEIGHT: u32 = 1;
const TAG_WEIGHT: u32 = 1;

/// Optional narrowing for the scored search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookFilters {
    #[serde(default)]
    pub category: Option<String>,

    /// `true` keeps only borrowable books; `false` or absent keeps all.
    #[serde(default)]
    pub available: Option<bool>,

    /// Minimum publish year.
    #[serde(default, rename = "year")]
    pub min_year: Option<i32>,
}

impl BookFilters {
    fn accepts(&self, book: &Book) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| book.category.to_lowercase() == c.to_lowercase());
        let available_ok = !self.available.unwrap_or(false) || book.is_available();
        let year_ok = self.min_year.is_none_or(|year| book.publish_year >= year);
        category_ok && available_ok && year_ok
    }
}

/// A book with its relevance score for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredBook {
    #[serde(flatten)]
    pub book: Book,
    #[serde(rename = "relevanceScore")]
    pub score: u32,
}

/// Sum of field weights over every whitespace-separated query term.
///
/// A term matching several fields adds every matching weight.
pub fn relevance_score(book: &Book, query: &str) -> u32 {
    let title = book.title.to_lowercase();
    let author = book.author.to_lowercase();
    let description = book.description.to_lowercase();

    query
        .to_lowercase()
        .split_whitespace()
        .map(|term| {
            let mut score = 0;
            if title.contains(term) {
                score += TITLE_WEIGHT;
            }
            if author.contains(term) {
                score += AUTHOR_WEIGHT;
            }
            if description.contains(term) {
                score += DESCRIPTION_WEIGHT;
            }
            if book.has_tag_containing(term) {
                score += TAG_WEIGHT;
            }
            score
        })
        .sum()
}

/// Unscored substring search in catalog order. An empty query matches all.
pub fn search_books<'a>(store: &'a DatasetStore, query: &str) -> Vec<&'a Book> {
    let needle = query.to_lowercase();
    store
        .all_books()
        .iter()
        .filter(|book| book.mentions(&needle))
        .collect()
}

/// Filtered search ranked by [`relevance_score`], descending, ties in
/// catalog order. Returns the capped page and the total match count.
pub fn search_scored(store: &DatasetStore, query: &str, filters: &BookFilters) -> (Vec<ScoredBook>, usize) {
    let mut scored: Vec<ScoredBook> = search_books(store, query)
        .into_iter()
        .filter(|book| filters.accepts(book))
        .map(|book| ScoredBook {
            score: relevance_score(book, query),
            book: book.clone(),
        })
        .collect();

    // sort_by is stable, so equal scores keep catalog order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    let total = scored.len();
    scored.truncate(SCORED_LIMIT);
    (scored, total)
}

/// Books matching any of `terms`, capped for prompt augmentation.
pub fn search_for_chat(store: &DatasetStore, terms: &[String]) -> Vec<Book> {
    let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    store
        .all_books()
        .iter()
        .filter(|book| lowered.iter().any(|term| book.mentions(term)))
        .take(CHAT_LIMIT)
        .cloned()
        .collect()
}

/// Books of one category (case-insensitive equality), or all when `None`.
pub fn books_in_category<'a>(store: &'a DatasetStore, category: Option<&str>) -> Vec<&'a Book> {
    let wanted = category.map(str::to_lowercase);
    store
        .all_books()
        .iter()
        .filter(|book| {
            wanted
                .as_deref()
                .is_none_or(|c| book.category.to_lowercase() == c)
        })
        .collect()
}

/// Borrowable books in catalog order.
pub fn available_books(store: &DatasetStore) -> Vec<&Book> {
    store
        .all_books()
        .iter()
        .filter(|book| book.is_available())
        .collect()
}

/// Resolve a reading list, silently dropping unknown ids.
pub fn resolve(store: &DatasetStore, set: &RecommendationSet, limit: Option<usize>) -> ResolvedRecommendation {
    let books = set
        .books
        .iter()
        .filter_map(|id| store.book(id))
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    ResolvedRecommendation {
        category: set.category.clone(),
        description: set.description.clone(),
        books,
    }
}

/// The reading list for a category hint, falling back to the new-student
/// list. At most [`RECOMMENDATION_LIMIT`] books.
pub fn recommend(store: &DatasetStore, hint: Option<&str>) -> Option<ResolvedRecommendation> {
    let sets = store.recommendation_sets();

    let hinted = hint.filter(|h| !h.is_empty()).and_then(|hint| {
        let hint = hint.to_lowercase();
        sets.iter().find(|set| set.category.to_lowercase().contains(&hint))
    });

    hinted
        .or_else(|| sets.iter().find(|set| set.category.contains(FALLBACK_RECOMMENDATION)))
        .map(|set| resolve(store, set, Some(RECOMMENDATION_LIMIT)))
}

/// Every reading list, fully resolved.
pub fn all_recommendations(store: &DatasetStore) -> Vec<ResolvedRecommendation> {
    store
        .recommendation_sets()
        .iter()
        .map(|set| resolve(store, set, None))
        .collect()
}

/// The first described reading list that includes any of `books`.
pub fn recommendation_for_results(store: &DatasetStore, books: &[ScoredBook]) -> Option<ResolvedRecommendation> {
    store
        .recommendation_sets()
        .iter()
        .filter(|set| !set.description.trim().is_empty())
        .find(|set| {
            set.books
                .iter()
                .any(|id| books.iter().any(|scored| &scored.book.id == id))
        })
        .map(|set| resolve(store, set, None))
}
