//! Keys used to recognise the same tool across local and AI results.

use regex::Regex;
use std::sync::OnceLock;

static SCHEME_RE: OnceLock<Regex> = OnceLock::new();

fn scheme_re() -> &'static Regex {
    SCHEME_RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9+.\-]*://").expect("valid regex"))
}

/// Case-folded URL without scheme, leading `www.` or trailing slashes.
///
/// `https://www.Figma.com/` and `http://figma.com` both become `figma.com`.
pub fn normalize_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let without_scheme = scheme_re().replace(&lower, "");
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(&*without_scheme);
    without_www.trim_end_matches('/').to_string()
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
