use crate::api::{endpoints, ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::profile::UserEnvelope;
use crate::models::{ProfileUpdate, UserStats};
use crate::session::User;
use crate::validation;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Profile details, avatar and contribution stats
#[derive(Clone)]
pub struct ProfileService {
    client: ApiClient,
}

impl ProfileService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> ApiResult<User> {
        let response = self.client.execute(ApiRequest::get(endpoints::PROFILE)).await?;
        decode_user(response.body)
    }

    pub async fn stats(&self) -> ApiResult<UserStats> {
        self.client.fetch(ApiRequest::get(endpoints::STATS)).await
    }

    /// Save name/bio (and optionally a new password); the session picks up the
    /// returned user
    pub async fn update(&self, update: &ProfileUpdate) -> ApiResult<User> {
        validation::require("Name", &update.name)?;

        let body = serde_json::to_value(update)?;
        let response = self
            .client
            .execute(ApiRequest::put(endpoints::PROFILE).json(body))
            .await?;
        let user = decode_user(response.body)?;

        self.client.session().set_user(user.clone());
        info!(target: "session", "Profile updated for {}", user.email);
        Ok(user)
    }

    pub async fn upload_avatar(&self, path: &Path) -> ApiResult<User> {
        let mime = image_mime(path).ok_or_else(|| {
            ApiError::validation("Avatar must be a png, jpg, gif or webp image")
        })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::validation(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("avatar")
            .to_string();

        let request = ApiRequest::post(endpoints::AVATAR).file("avatar", &file_name, mime, bytes);
        let response = self.client.execute(request).await?;
        let user = decode_user(response.body)?;

        self.client.session().set_user(user.clone());
        Ok(user)
    }
}

/// Accepts `{ "user": {...} }` or a bare user object
fn decode_user(body: Value) -> ApiResult<User> {
    if body.get("user").is_some() {
        let envelope: UserEnvelope = serde_json::from_value(body)?;
        return Ok(envelope.user);
    }
    Ok(serde_json::from_value(body)?)
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_user_shapes() {
        let user = json!({ "id": "u1", "name": "Ada", "email": "ada@example.com", "role": ["USER"] });
        assert_eq!(decode_user(json!({ "user": user.clone() })).unwrap().id, "u1");
        assert_eq!(decode_user(user).unwrap().name, "Ada");
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("me.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("me.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("me.txt")), None);
        assert_eq!(image_mime(Path::new("avatar")), None);
    }
}
