//! Endpoint paths relative to the API base URL (`.../api/v1`).

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const GOOGLE: &str = "/auth/google";
pub const REFRESH_TOKEN: &str = "/auth/refresh-token";
pub const VERIFY_PASSWORD: &str = "/auth/verify-password";

pub const PROFILE: &str = "/user/profile";
pub const AVATAR: &str = "/user/avatar";
pub const STATS: &str = "/user/stats";

pub const POSTS: &str = "/post";
pub const ADD_POST: &str = "/post/addWebsite";
pub const SEARCH_AI: &str = "/post/search-ai";

pub const COLLECTIONS: &str = "/collections";
pub const CONTACT: &str = "/contact";

/// Endpoints that are called without a bearer credential
pub const PUBLIC_ENDPOINTS: [&str; 3] = [LOGIN, REGISTER, GOOGLE];

pub fn is_public(path: &str) -> bool {
    PUBLIC_ENDPOINTS.iter().any(|p| path.starts_with(p))
}

pub fn is_refresh(path: &str) -> bool {
    path.starts_with(REFRESH_TOKEN)
}

pub fn post(id: &str) -> String {
    format!("{}/{}", POSTS, id)
}

/// `like`, `view` or `approve` on a single post
pub fn post_action(id: &str, action: &str) -> String {
    format!("{}/{}/{}", POSTS, id, action)
}

pub fn collection(id: &str) -> String {
    format!("{}/{}", COLLECTIONS, id)
}

pub fn collection_action(id: &str, action: &str) -> String {
    format!("{}/{}/{}", COLLECTIONS, id, action)
}
