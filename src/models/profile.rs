use crate::session::User;
use serde::{Deserialize, Serialize};

/// Counters shown on the profile page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub tools: u64,
    #[serde(default)]
    pub collections: u64,
}

/// Payload of `PUT /user/profile`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: String,
    /// New password; omitted when unchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Profile and avatar endpoints answer with the updated user
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// Payload of `POST /contact`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
