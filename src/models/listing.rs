use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of locally generated ids for AI suggestions. Server ids never carry it.
pub const AI_ID_PREFIX: &str = "ai-";

/// Categories offered by the submission and edit forms
pub const CATEGORIES: [&str; 6] = [
    "Development",
    "Design",
    "Productivity",
    "AI",
    "Learning",
    "DevOps",
];

/// Where a listing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSource {
    /// Stored in the directory (submitted by a person)
    #[default]
    Community,
    /// Suggested by the AI search endpoint; never persisted
    Ai,
}

/// Votes arrive either as the list of voter ids or as a bare count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Upvotes {
    Voters(Vec<String>),
    Count(u64),
}

impl Default for Upvotes {
    fn default() -> Self {
        Upvotes::Count(0)
    }
}

impl Upvotes {
    pub fn count(&self) -> u64 {
        match self {
            Upvotes::Voters(voters) => voters.len() as u64,
            Upvotes::Count(n) => *n,
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        match self {
            Upvotes::Voters(voters) => voters.iter().any(|v| v == user_id),
            Upvotes::Count(_) => false,
        }
    }
}

/// A tool in the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub upvotes: Upvotes,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub approved: bool,
    /// User id, or the populated user object on some endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub source: ListingSource,
}

impl Listing {
    pub fn is_ai(&self) -> bool {
        self.source == ListingSource::Ai || self.id.starts_with(AI_ID_PREFIX)
    }

    /// Whether like/view/approve/edit/delete may be sent for this listing
    pub fn is_mutable(&self) -> bool {
        !self.is_ai() && !self.id.is_empty()
    }

    pub fn like_count(&self) -> u64 {
        self.upvotes.count()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.upvotes.contains(user_id)
    }

    /// Mark as an AI suggestion with a locally generated placeholder id
    pub fn into_ai_suggestion(mut self) -> Self {
        self.id = format!("{}{}", AI_ID_PREFIX, uuid::Uuid::new_v4());
        self.source = ListingSource::Ai;
        self.approved = false;
        self
    }
}

/// One page of `GET /post`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    #[serde(rename = "websites", default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(rename = "totalWebsites", default)]
    pub total_listings: u64,
}

/// Body of `POST /post/search-ai`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiSuggestions {
    #[serde(rename = "websites", default)]
    pub listings: Vec<Listing>,
}

/// Payload of `POST /post/addWebsite`. Blank optional fields are left for the
/// backend to fill in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingDraft {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update for `PUT /post/:id`; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tags.is_none()
    }

    /// Apply to a local copy so views can update without refetching
    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(title) = &self.title {
            listing.title = title.clone();
        }
        if let Some(url) = &self.url {
            listing.url = url.clone();
        }
        if let Some(description) = &self.description {
            listing.description = description.clone();
        }
        if let Some(category) = &self.category {
            listing.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            listing.tags = tags.clone();
        }
    }
}

/// Split a comma separated tag field: trimmed, empties dropped
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
