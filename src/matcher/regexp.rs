use regex::{Regex, RegexBuilder};

use super::UrlMatcher;

/// Matcher for inline `/.../` regular expression rules
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Create a matcher from a `/.../` pattern; the interior is used verbatim.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let interior = pattern
            .strip_prefix('/')
            .and_then(|p| p.strip_suffix('/'))
            .unwrap_or(pattern);
        Self::from_expression(interior)
    }

    /// Create a matcher from a bare regular expression
    pub fn from_expression(expression: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(expression)
            .case_insensitive(true)
            .build()?;
        Ok(Self { regex })
    }

    /// The regular expression source
    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }
}

impl UrlMatcher for RegexMatcher {
    fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}
