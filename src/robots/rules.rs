//! robots.txt parsing and rule matching.
//!
//! A robots.txt document is an ordered list of agent groups. Rule resolution
//! picks the **first** group whose agent list names this crawler (exact,
//! case-insensitive) or carries the `*` wildcard, then applies only that
//! group's rules. Path checks are prefix matches with explicit `Allow`
//! winning over `Disallow`.

const USER_AGENT_DIRECTIVE: &str = "User-agent:";
const DISALLOW_DIRECTIVE: &str = "Disallow:";
const ALLOW_DIRECTIVE: &str = "Allow:";
const CRAWL_DELAY_DIRECTIVE: &str = "Crawl-delay:";
const WILDCARD_AGENT: &str = "*";

/// One `User-agent` block from a robots.txt document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsGroup {
    /// Agent names this group applies to (consecutive `User-agent:` lines).
    pub agents: Vec<String>,
    /// Disallowed path prefixes.
    pub disallows: Vec<String>,
    /// Explicitly allowed path prefixes (win over disallows).
    pub allows: Vec<String>,
    /// Crawl-delay in milliseconds, when the group sets one.
    pub crawl_delay_ms: Option<u64>,
}

impl RobotsGroup {
    /// Whether this group applies to the given agent name.
    #[must_use]
    pub fn matches(&self, agent: &str) -> bool {
        self.agents
            .iter()
            .any(|a| a == WILDCARD_AGENT || a.eq_ignore_ascii_case(agent))
    }
}

/// The resolved rule set for one matched agent group.
///
/// Computed once per crawl run and shared read-only by all workers. The
/// empty value (no rules, zero delay) is also the fail-soft result when
/// robots.txt cannot be fetched or parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    /// Disallowed path prefixes.
    pub disallows: Vec<String>,
    /// Explicitly allowed path prefixes.
    pub allows: Vec<String>,
    /// Required delay between requests, milliseconds (0 = none).
    pub delay_ms: u64,
}

impl RobotsRules {
    /// Whether the given URL path may be crawled under these rules.
    ///
    /// An explicit `Allow` prefix match wins over a `Disallow` prefix match;
    /// with no matching rule the path is allowed. Matching is
    /// case-insensitive, mirroring how most sites author their rules.
    #[must_use]
    pub fn is_allowed(&self, path: &str) -> bool {
        if self.allows.iter().any(|rule| has_prefix(path, rule)) {
            return true;
        }
        !self.disallows.iter().any(|rule| has_prefix(path, rule))
    }
}

/// ASCII-case-insensitive prefix test, safe on any UTF-8 input.
fn has_prefix(path: &str, rule: &str) -> bool {
    path.as_bytes()
        .get(..rule.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(rule.as_bytes()))
}

/// Returns the value of `line` if it starts with `directive` (case-insensitive).
fn directive_value<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
    if line.len() >= directive.len()
        && line.as_bytes()[..directive.len()].eq_ignore_ascii_case(directive.as_bytes())
    {
        Some(line[directive.len()..].trim())
    } else {
        None
    }
}

/// Parses a robots.txt document into its ordered agent groups.
///
/// Blank lines and `#` comments are skipped. Consecutive `User-agent:`
/// lines accumulate into one group until any other directive is seen; the
/// next `User-agent:` after that starts a new group. Directives appearing
/// before the first `User-agent:` line belong to no group and are dropped.
#[must_use]
pub fn parse_groups(content: &str) -> Vec<RobotsGroup> {
    let mut groups: Vec<RobotsGroup> = Vec::new();
    let mut current: Option<RobotsGroup> = None;
    // set once the current group has seen a non-agent directive
    let mut group_closed = false;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(agent) = directive_value(line, USER_AGENT_DIRECTIVE) {
            if agent.is_empty() {
                continue;
            }
            match current.as_mut() {
                Some(group) if !group_closed => group.agents.push(agent.to_string()),
                _ => {
                    if let Some(finished) = current.take() {
                        groups.push(finished);
                    }
                    current = Some(RobotsGroup {
                        agents: vec![agent.to_string()],
                        ..RobotsGroup::default()
                    });
                    group_closed = false;
                }
            }
            continue;
        }

        let Some(group) = current.as_mut() else {
            // orphan directive before any User-agent line
            continue;
        };
        // any non-agent directive ends the agent-line run, handled or not
        group_closed = true;

        if let Some(path) = directive_value(line, DISALLOW_DIRECTIVE) {
            if !path.is_empty() {
                group.disallows.push(path.to_string());
            }
        } else if let Some(path) = directive_value(line, ALLOW_DIRECTIVE) {
            if !path.is_empty() {
                group.allows.push(path.to_string());
            }
        } else if let Some(value) = directive_value(line, CRAWL_DELAY_DIRECTIVE) {
            // seconds in the source text, milliseconds everywhere else
            if let Ok(seconds) = value.parse::<u64>() {
                group.crawl_delay_ms = Some(seconds.saturating_mul(1000));
            }
        }
    }

    if let Some(finished) = current.take() {
        groups.push(finished);
    }

    groups
}

/// Resolves the rule set for `agent` from a robots.txt document.
///
/// Selects the first group matching `agent` (or `*`); when no group
/// matches, the crawl proceeds unrestricted.
#[must_use]
pub fn resolve_rules(content: &str, agent: &str) -> RobotsRules {
    parse_groups(content)
        .into_iter()
        .find(|group| group.matches(agent))
        .map(|group| RobotsRules {
            disallows: group.disallows,
            allows: group.allows,
            delay_ms: group.crawl_delay_ms.unwrap_or(0),
        })
        .unwrap_or_default()
}
