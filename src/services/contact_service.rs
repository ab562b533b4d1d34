use crate::api::{endpoints, ApiClient, ApiRequest};
use crate::error::ApiResult;
use crate::models::SupportMessage;
use crate::validation;

#[derive(Clone)]
pub struct ContactService {
    client: ApiClient,
}

impl ContactService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn send(&self, message: &SupportMessage) -> ApiResult<()> {
        validation::require("Name", &message.name)?;
        validation::email(&message.email)?;
        validation::require("Subject", &message.subject)?;
        validation::require("Message", &message.message)?;

        let body = serde_json::to_value(message)?;
        self.client
            .execute(ApiRequest::post(endpoints::CONTACT).json(body))
            .await?;
        Ok(())
    }
}
