//! Form checks run before anything is sent to the server.

use crate::error::{ApiError, ApiResult};
use regex::Regex;
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static HTTP_URL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

fn http_url_re() -> &'static Regex {
    HTTP_URL_RE
        .get_or_init(|| Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("valid regex"))
}

pub fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub fn email(value: &str) -> ApiResult<()> {
    require("Email", value)?;
    if !email_re().is_match(value.trim()) {
        return Err(ApiError::validation("Enter a valid email address"));
    }
    Ok(())
}

pub fn http_url(value: &str) -> ApiResult<()> {
    require("URL", value)?;
    if !http_url_re().is_match(value.trim()) {
        return Err(ApiError::validation(
            "URL must start with http:// or https://",
        ));
    }
    Ok(())
}

pub fn login(email_value: &str, password: &str) -> ApiResult<()> {
    email(email_value)?;
    require("Password", password)
}

pub fn registration(name: &str, email_value: &str, password: &str) -> ApiResult<()> {
    require("Name", name)?;
    email(email_value)?;
    require("Password", password)
}
