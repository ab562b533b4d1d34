use super::listing::Listing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's bookmark folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "websites", default)]
    pub listings: Vec<Listing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn contains(&self, listing_id: &str) -> bool {
        self.listings.iter().any(|l| l.id == listing_id)
    }

    /// Drop a listing locally after the server confirmed the removal
    pub fn remove_local(&mut self, listing_id: &str) -> bool {
        let before = self.listings.len();
        self.listings.retain(|l| l.id != listing_id);
        self.listings.len() != before
    }
}
