//! Candidate href normalization.
//!
//! Every href discovered during extraction passes through [`sanitize_url`]
//! before it can enter the frontier. The sanitizer resolves relative
//! references against the page they were found on, filters out
//! non-fetchable schemes and binary assets, and canonicalizes the result
//! so the visited-set can deduplicate reliably.

use url::Url;

/// File extensions that never yield crawlable HTML.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".zip", ".rar", ".jpg", ".png", ".gif", ".mp4",
    ".mp3", ".m4a",
];

/// Normalizes a candidate `href` against the URL of the page it was found on.
///
/// Returns the absolute URL with any trailing slash trimmed, or `None` when
/// the href is not worth crawling: empty or whitespace-only input,
/// fragment-only references, schemes other than http/https, binary or
/// document assets, or anything that fails URL resolution. Rejection is
/// always `None`; this function never errors out to the caller.
///
/// Host filtering is not done here. Cross-host results are returned intact
/// and left to the extraction layer to drop.
#[must_use]
pub fn sanitize_url(href: &str, base: &str) -> Option<String> {
    if href.trim().is_empty() || href.starts_with('#') {
        return None;
    }

    let base = Url::parse(base).ok()?;
    let resolved = base.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    let path = resolved.path().to_lowercase();
    if EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return None;
    }

    Some(resolved.as_str().trim_end_matches('/').to_string())
}
