//! Link extraction.
//!
//! Everything between "here is a page URL" and "here are its outbound
//! links, classified": the URL sanitizer, the static and rendered
//! extraction strategies, the headless browser session behind the
//! rendered one, and the chain that orders them.

mod browser;
mod error;
mod rendered;
mod sanitizer;
mod service;
mod static_html;

pub use browser::{BrowserProvider, DEFAULT_WEBDRIVER_URL};
pub use error::ExtractError;
pub use rendered::RenderedHtmlParser;
pub use sanitizer::sanitize_url;
pub use service::{ExtractRequest, ExtractionStrategy, ParserResponse, ParserService};
pub use static_html::StaticHtmlParser;
