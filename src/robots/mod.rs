//! robots.txt rule engine.
//!
//! Parses a robots.txt document into ordered agent groups, resolves the one
//! group that applies to this crawler, and answers allow/disallow and
//! crawl-delay questions for the run.

mod rules;
mod service;

pub use rules::{RobotsGroup, RobotsRules, parse_groups, resolve_rules};
pub use service::RobotsService;
