//! HybridSearch - fills a short page of directory results with AI suggestions.
//!
//! Only page 1 of a search for a term longer than two characters is
//! augmented, and only when the directory returned fewer rows than the page
//! holds. Suggestions that match a local row by URL or title are dropped;
//! local rows always come first.

use super::normalize::{normalize_title, normalize_url};
use crate::error::ApiResult;
use crate::models::{Listing, ListingPage};
use crate::services::{ListingQuery, ListingService, DEFAULT_PAGE_SIZE};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terms shorter than this never reach the AI endpoint
pub const DEFAULT_AI_MIN_TERM_LEN: usize = 3;

/// Where search results come from
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// The authoritative (stored) listings
    async fn fetch_page(&self, query: &ListingQuery) -> ApiResult<ListingPage>;

    /// Supplementary suggestions; best effort
    async fn suggest(&self, term: &str) -> ApiResult<Vec<Listing>>;
}

#[async_trait]
impl SearchBackend for ListingService {
    async fn fetch_page(&self, query: &ListingQuery) -> ApiResult<ListingPage> {
        self.list(query).await
    }

    async fn suggest(&self, term: &str) -> ApiResult<Vec<Listing>> {
        ListingService::suggest(self, term).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub term: String,
    pub category: String,
    pub page: u32,
    /// Local rows first, then AI suggestions
    pub listings: Vec<Listing>,
    /// Page count of the directory alone
    pub total_pages: u32,
    pub total_listings: u64,
    /// AI augmentation was triggered for this page
    pub ai_augmented: bool,
}

impl SearchResults {
    /// Pagination is hidden on augmented pages
    pub fn show_pagination(&self) -> bool {
        !self.ai_augmented && self.total_pages > 1
    }

    pub fn ai_count(&self) -> usize {
        self.listings.iter().filter(|l| l.is_ai()).count()
    }

    pub fn local_count(&self) -> usize {
        self.listings.len() - self.ai_count()
    }

    pub fn has_next_page(&self) -> bool {
        self.show_pagination() && self.page < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.show_pagination() && self.page > 1
    }
}

/// Whether a page should be topped up with AI suggestions
pub fn should_augment(
    term: &str,
    page: u32,
    local_count: usize,
    page_size: usize,
    min_term_len: usize,
) -> bool {
    page == 1 && term.trim().chars().count() >= min_term_len && local_count < page_size
}

/// Append suggestions that don't duplicate a local row, up to `page_size` total
pub fn merge_results(local: Vec<Listing>, suggestions: Vec<Listing>, page_size: usize) -> Vec<Listing> {
    let needed = page_size.saturating_sub(local.len());
    if needed == 0 {
        return local;
    }

    let mut seen_urls: HashSet<String> = local
        .iter()
        .map(|l| normalize_url(&l.url))
        .filter(|u| !u.is_empty())
        .collect();
    let mut seen_titles: HashSet<String> = local
        .iter()
        .map(|l| normalize_title(&l.title))
        .filter(|t| !t.is_empty())
        .collect();

    let mut merged = local;
    let mut added = 0;

    for suggestion in suggestions {
        if added == needed {
            break;
        }

        let url = normalize_url(&suggestion.url);
        let title = normalize_title(&suggestion.title);
        if seen_urls.contains(&url) || seen_titles.contains(&title) {
            debug!(target: "search", "Dropping duplicate suggestion {}", suggestion.title);
            continue;
        }

        if !url.is_empty() {
            seen_urls.insert(url);
        }
        if !title.is_empty() {
            seen_titles.insert(title);
        }
        merged.push(suggestion.into_ai_suggestion());
        added += 1;
    }

    merged
}

pub struct HybridSearch {
    backend: Arc<dyn SearchBackend>,
    page_size: usize,
    min_term_len: usize,
}

impl HybridSearch {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            page_size: DEFAULT_PAGE_SIZE as usize,
            min_term_len: DEFAULT_AI_MIN_TERM_LEN,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_min_term_len(mut self, min_term_len: usize) -> Self {
        self.min_term_len = min_term_len;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Search the directory, topping up page 1 with AI suggestions when short
    pub async fn search(&self, term: &str, category: &str, page: u32) -> ApiResult<SearchResults> {
        let page = page.max(1);
        let query = ListingQuery {
            search: term.to_string(),
            category: category.to_string(),
            page,
            limit: self.page_size as u32,
            approved: None,
        };

        let local_page = self.backend.fetch_page(&query).await?;
        let local_count = local_page.listings.len();

        let mut results = SearchResults {
            term: term.to_string(),
            category: category.to_string(),
            page,
            listings: local_page.listings,
            total_pages: local_page.total_pages,
            total_listings: local_page.total_listings,
            ai_augmented: false,
        };

        if !should_augment(term, page, local_count, self.page_size, self.min_term_len) {
            return Ok(results);
        }

        results.ai_augmented = true;
        match self.backend.suggest(term.trim()).await {
            Ok(suggestions) => {
                let available = suggestions.len();
                results.listings = merge_results(results.listings, suggestions, self.page_size);
                info!(
                    target: "search",
                    "'{}': {} local + {} AI ({} suggested)",
                    term,
                    local_count,
                    results.ai_count(),
                    available
                );
            }
            Err(e) => {
                warn!(target: "search", "AI suggestions unavailable for '{}': {}", term, e);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, title: &str, url: &str) -> Listing {
        serde_json::from_value(serde_json::json!({
            "_id": id, "title": title, "url": url
        }))
        .unwrap()
    }

    #[test]
    fn test_should_augment_rules() {
        assert!(should_augment("figma", 1, 2, 9, 3));
        assert!(should_augment("fig", 1, 0, 9, 3));
        assert!(!should_augment("ai", 1, 0, 9, 3));
        assert!(!should_augment("", 1, 0, 9, 3));
        assert!(!should_augment("   ", 1, 0, 9, 3));
        assert!(!should_augment("figma", 2, 0, 9, 3));
        assert!(!should_augment("figma", 1, 9, 9, 3));
    }

    #[test]
    fn test_merge_keeps_local_first_and_fills() {
        let local = vec![listing("1", "Figma", "https://figma.com")];
        let suggestions = vec![
            listing("", "Penpot", "https://penpot.app"),
            listing("", "Sketch", "https://sketch.com"),
        ];

        let merged = merge_results(local, suggestions, 9);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, "1");
        assert!(!merged[0].is_ai());
        assert!(merged[1].is_ai());
        assert!(merged[2].is_ai());
    }

    #[test]
    fn test_merge_drops_url_and_title_duplicates() {
        let local = vec![listing("1", "Figma", "https://www.figma.com/")];
        let suggestions = vec![
            listing("", "Figma Design", "http://figma.com"),
            listing("", "FIGMA", "https://figma.design"),
            listing("", "Penpot", "https://penpot.app"),
        ];

        let merged = merge_results(local, suggestions, 9);
        let titles: Vec<&str> = merged.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Figma", "Penpot"]);
    }

    #[test]
    fn test_merge_truncates_to_page_size() {
        let local = vec![listing("1", "A", "https://a.dev")];
        let suggestions = (0..20)
            .map(|i| listing("", &format!("S{}", i), &format!("https://s{}.dev", i)))
            .collect();

        let merged = merge_results(local, suggestions, 4);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_pagination_hidden_when_augmented() {
        let results = SearchResults {
            total_pages: 3,
            page: 1,
            ai_augmented: true,
            ..Default::default()
        };
        assert!(!results.show_pagination());
        assert!(!results.has_next_page());

        let results = SearchResults {
            total_pages: 3,
            page: 2,
            ..Default::default()
        };
        assert!(results.has_next_page());
        assert!(results.has_prev_page());
    }
}
