use crate::api::{endpoints, ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::listing::AiSuggestions;
use crate::models::{Listing, ListingDraft, ListingPage, ListingUpdate};
use crate::validation;
use serde_json::json;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Result of a mutation that AI suggestions are excluded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// The listing is an AI suggestion; nothing was sent
    Skipped,
}

/// Filters for `GET /post`
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub search: String,
    pub category: String,
    pub page: u32,
    pub limit: u32,
    /// `Some(false)` lists the moderation queue
    pub approved: Option<bool>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            approved: None,
        }
    }
}

impl ListingQuery {
    pub fn search(term: &str) -> Self {
        Self {
            search: term.to_string(),
            ..Default::default()
        }
    }

    pub fn pending(page: u32) -> Self {
        Self {
            page,
            approved: Some(false),
            ..Default::default()
        }
    }

    pub fn to_request(&self) -> ApiRequest {
        let mut request = ApiRequest::get(endpoints::POSTS)
            .query("search", &self.search)
            .query("category", &self.category)
            .query("page", self.page.max(1))
            .query("limit", self.limit);
        if let Some(approved) = self.approved {
            request = request.query("approved", approved);
        }
        request
    }
}

/// Directory listings: browsing, submission and moderation
#[derive(Clone)]
pub struct ListingService {
    client: ApiClient,
}

impl ListingService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListingQuery) -> ApiResult<ListingPage> {
        debug!(target: "search", "Listing page {} for {:?}", query.page, query.search);
        self.client.fetch(query.to_request()).await
    }

    /// Raw suggestions from the AI endpoint, not yet tagged or deduplicated
    pub async fn suggest(&self, term: &str) -> ApiResult<Vec<Listing>> {
        let request = ApiRequest::post(endpoints::SEARCH_AI).json(json!({ "query": term }));
        let suggestions: AiSuggestions = self.client.fetch(request).await?;
        Ok(suggestions.listings)
    }

    /// Submit a tool for review. Returns the server's confirmation message.
    pub async fn submit(&self, draft: &ListingDraft) -> ApiResult<String> {
        validation::require("Title", &draft.title)?;
        validation::http_url(&draft.url)?;

        let body = serde_json::to_value(draft)?;
        let response = self
            .client
            .execute(ApiRequest::post(endpoints::ADD_POST).json(body))
            .await?;

        Ok(response
            .body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Tool submitted for review")
            .to_string())
    }

    pub async fn like(&self, listing: &Listing) -> ApiResult<ActionOutcome> {
        self.post_action(listing, "like").await
    }

    /// Record a click-through
    pub async fn view(&self, listing: &Listing) -> ApiResult<ActionOutcome> {
        self.post_action(listing, "view").await
    }

    pub async fn approve(&self, listing: &Listing) -> ApiResult<ActionOutcome> {
        if listing.is_mutable() {
            self.require_admin("approve listings")?;
        }
        self.post_action(listing, "approve").await
    }

    pub async fn update(&self, listing: &Listing, update: &ListingUpdate) -> ApiResult<ActionOutcome> {
        if !listing.is_mutable() {
            return Ok(ActionOutcome::Skipped);
        }
        self.require_admin("edit listings")?;
        if let Some(url) = &update.url {
            validation::http_url(url)?;
        }
        if update.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }

        let body = serde_json::to_value(update)?;
        self.client
            .execute(ApiRequest::put(endpoints::post(&listing.id)).json(body))
            .await?;
        Ok(ActionOutcome::Applied)
    }

    pub async fn delete(&self, listing: &Listing) -> ApiResult<ActionOutcome> {
        if !listing.is_mutable() {
            return Ok(ActionOutcome::Skipped);
        }
        self.require_admin("delete listings")?;

        self.client
            .execute(ApiRequest::delete(endpoints::post(&listing.id)))
            .await?;
        Ok(ActionOutcome::Applied)
    }

    async fn post_action(&self, listing: &Listing, action: &str) -> ApiResult<ActionOutcome> {
        if !listing.is_mutable() {
            debug!(target: "search", "Skipping {} on AI suggestion {}", action, listing.title);
            return Ok(ActionOutcome::Skipped);
        }

        self.client
            .execute(ApiRequest::put(endpoints::post_action(&listing.id, action)))
            .await?;
        Ok(ActionOutcome::Applied)
    }

    fn require_admin(&self, what: &str) -> ApiResult<()> {
        if self.client.session().is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("Only admins can {}", what)))
        }
    }
}
