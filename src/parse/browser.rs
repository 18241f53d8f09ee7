//! Headless browser session management.
//!
//! The rendered strategy needs a real browser. Sessions are expensive to
//! start, so the provider creates one lazily on first use and reuses it
//! for every rendered extraction in the run, then quits it once at the
//! end. Connects to an already-running WebDriver endpoint (chromedriver
//! or a Selenium server); in containers the Chrome binary can be pointed
//! at explicitly via `CHROME_BINARY`.

use std::time::Duration;

use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default WebDriver endpoint (chromedriver's standalone port).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Ready-state polling bounds: up to 5 checks, 300ms apart.
const DOM_READY_MAX_POLLS: u32 = 5;
const DOM_READY_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Lazily-created, shared headless browser session.
///
/// The session lock is held for a whole render. A WebDriver session holds
/// one page at a time, so interleaved renders from different workers would
/// read each other's documents.
pub struct BrowserProvider {
    webdriver_url: String,
    driver: Mutex<Option<WebDriver>>,
}

impl BrowserProvider {
    /// Creates a provider that will connect to `webdriver_url` on first use.
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            driver: Mutex::new(None),
        }
    }

    /// Renders raw HTML in the browser and returns the settled DOM.
    ///
    /// Navigates to `about:blank`, writes the fetched HTML into the empty
    /// document through the DOM API, waits (bounded) for the document
    /// ready state so client-side rendering can run, and reads the page
    /// source back out.
    pub async fn render(&self, html: &str) -> Result<String, WebDriverError> {
        let mut guard = self.driver.lock().await;

        let driver = match guard.as_ref() {
            Some(driver) => driver.clone(),
            None => {
                let driver = Self::connect(&self.webdriver_url).await?;
                *guard = Some(driver.clone());
                driver
            }
        };

        driver.goto("about:blank").await?;
        driver
            .execute(
                "document.write(arguments[0]);",
                vec![serde_json::Value::String(html.to_string())],
            )
            .await?;

        wait_until_dom_ready(&driver).await;

        driver.source().await
    }

    async fn connect(webdriver_url: &str) -> Result<WebDriver, WebDriverError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.add_chrome_arg("--no-sandbox")?;
        caps.add_chrome_arg("--disable-dev-shm-usage")?;
        caps.add_chrome_arg("--disable-gpu")?;

        if let Ok(binary) = std::env::var("CHROME_BINARY") {
            caps.set_binary(&binary)?;
        }

        info!(webdriver_url, "starting headless browser session");
        WebDriver::new(webdriver_url, caps).await
    }

    /// Quits the browser session if one was ever created. Call once at
    /// the end of the run.
    pub async fn shutdown(&self) {
        let mut guard = self.driver.lock().await;
        if let Some(driver) = guard.take() {
            match driver.quit().await {
                Ok(()) => debug!("browser session closed"),
                Err(error) => warn!(%error, "failed to quit browser session"),
            }
        }
    }
}

/// Polls `document.readyState` until the DOM settles or the poll budget
/// runs out; rendering proceeds either way.
async fn wait_until_dom_ready(driver: &WebDriver) {
    for _ in 0..DOM_READY_MAX_POLLS {
        let ready = match driver
            .execute("return document.readyState", Vec::new())
            .await
        {
            Ok(ret) => matches!(ret.json().as_str(), Some("interactive" | "complete")),
            Err(error) => {
                // might be transient, retry
                debug!(%error, "ready-state check failed");
                false
            }
        };

        if ready {
            return;
        }
        tokio::time::sleep(DOM_READY_POLL_INTERVAL).await;
    }

    debug!("DOM never reported ready, proceeding with current source");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_without_session_is_noop() {
        let provider = BrowserProvider::new(DEFAULT_WEBDRIVER_URL);
        provider.shutdown().await;
    }

    #[test]
    fn test_default_webdriver_url_is_chromedriver() {
        assert!(DEFAULT_WEBDRIVER_URL.ends_with("9515"));
    }
}
