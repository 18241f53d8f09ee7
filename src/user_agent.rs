//! Shared User-Agent string for all crawler HTTP traffic.
//!
//! Single source for the project URL and UA format so page fetches and the
//! robots.txt fetch identify themselves identically (good citizenship;
//! RFC 9308). The agent *name* is also what the robots rule engine matches
//! against `User-agent:` groups, so it must stay stable.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/crawler";

/// Agent name matched against robots.txt `User-agent:` groups.
pub const AGENT_NAME: &str = "crawler";

/// Default User-Agent header for all crawl requests.
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{AGENT_NAME}/{version} (sitemap-crawler; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_contains_project_url_and_version() {
        let ua = default_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("crawler/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
            "UA must contain crate version"
        );
    }

    #[test]
    fn test_ua_starts_with_agent_name() {
        // The robots matcher compares group agents against AGENT_NAME, so the
        // header product token must begin with it.
        assert!(default_user_agent().starts_with(AGENT_NAME));
    }
}
