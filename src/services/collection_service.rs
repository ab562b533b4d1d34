use super::listing_service::ActionOutcome;
use crate::api::{endpoints, ApiClient, ApiRequest};
use crate::error::ApiResult;
use crate::models::{Collection, Listing};
use crate::validation;
use serde_json::json;

/// Bookmark folders owned by the signed-in user
#[derive(Clone)]
pub struct CollectionService {
    client: ApiClient,
}

impl CollectionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Collection>> {
        self.client.fetch(ApiRequest::get(endpoints::COLLECTIONS)).await
    }

    pub async fn create(&self, name: &str) -> ApiResult<()> {
        validation::require("Folder name", name)?;
        let request = ApiRequest::post(endpoints::COLLECTIONS).json(json!({ "name": name.trim() }));
        self.client.execute(request).await?;
        Ok(())
    }

    /// AI suggestions have no server id and cannot be bookmarked
    pub async fn add(&self, collection_id: &str, listing: &Listing) -> ApiResult<ActionOutcome> {
        if !listing.is_mutable() {
            return Ok(ActionOutcome::Skipped);
        }

        let request = ApiRequest::put(endpoints::collection_action(collection_id, "add"))
            .json(json!({ "websiteId": listing.id }));
        self.client.execute(request).await?;
        Ok(ActionOutcome::Applied)
    }

    pub async fn remove(&self, collection_id: &str, listing_id: &str) -> ApiResult<()> {
        let request = ApiRequest::put(endpoints::collection_action(collection_id, "remove"))
            .json(json!({ "websiteId": listing_id }));
        self.client.execute(request).await?;
        Ok(())
    }

    pub async fn delete(&self, collection_id: &str) -> ApiResult<()> {
        self.client
            .execute(ApiRequest::delete(endpoints::collection(collection_id)))
            .await?;
        Ok(())
    }
}
