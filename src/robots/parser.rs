//! robots.txt file model
//!
//! Permission checks go through the `robotstxt` matcher. Directive listing
//! (Allow/Disallow paths and Sitemap lines) is a plain line scan, since the
//! matcher does not expose the rules it parsed.

use robotstxt::DefaultMatcher;

/// Kind of a path rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Allow,
    Disallow,
}

/// One `Allow:` or `Disallow:` line, regardless of user-agent group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    pub kind: RuleKind,
    pub path: String,
}

/// A site's robots.txt as served
///
/// An empty body places no restriction on any agent.
#[derive(Debug, Clone, Default)]
pub struct RobotsFile {
    body: String,
}

impl RobotsFile {
    pub fn parse(body: &str) -> Self {
        Self {
            body: body.to_string(),
        }
    }

    /// Stand-in for a site that serves no robots.txt
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `agent` may fetch `url` (absolute URL or bare path)
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.body.trim().is_empty() {
            return true;
        }

        DefaultMatcher::default().one_agent_allowed_by_robots(&self.body, agent, url)
    }

    /// Lists every Allow/Disallow path in file order
    ///
    /// Rules with an empty path (`Disallow:` meaning "allow everything") are
    /// left out.
    pub fn rules(&self) -> Vec<RobotsRule> {
        self.directives()
            .filter_map(|(key, value)| {
                let kind = match key.as_str() {
                    "allow" => RuleKind::Allow,
                    "disallow" => RuleKind::Disallow,
                    _ => return None,
                };
                let path = value.split_whitespace().next()?;
                Some(RobotsRule {
                    kind,
                    path: path.to_string(),
                })
            })
            .collect()
    }

    /// Lists the `Sitemap:` URLs
    pub fn sitemaps(&self) -> Vec<String> {
        self.directives()
            .filter(|(key, value)| key == "sitemap" && !value.is_empty())
            .map(|(_, value)| value.to_string())
            .collect()
    }

    /// Yields `(lowercase key, trimmed value)` for each directive line
    fn directives(&self) -> impl Iterator<Item = (String, &str)> {
        self.body.lines().filter_map(|line| {
            let line = line.split('#').next().unwrap_or("").trim();
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_lowercase(), value.trim()))
        })
    }
}
