mod pattern;
mod regexp;
mod substring;

pub use self::pattern::{translate_pattern, PatternMatcher, DOMAIN_ANCHOR, SEPARATOR};
pub use self::regexp::RegexMatcher;
pub use self::substring::SubstringMatcher;

/// Trait for URL matchers
pub trait UrlMatcher: Send + Sync {
    /// Check if the URL matches this matcher
    fn matches(&self, url: &str) -> bool;
}

/// Enum wrapper for all matcher types
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Plain literal, no wildcards or anchors
    Substring(SubstringMatcher),
    /// Adblock pattern translated to an anchored regex
    Pattern(PatternMatcher),
    /// Inline `/.../` regular expression
    Regex(RegexMatcher),
}

impl Matcher {
    /// The literal or regular expression this matcher evaluates
    pub fn expression(&self) -> &str {
        match self {
            Matcher::Substring(m) => m.needle(),
            Matcher::Pattern(m) => m.expression(),
            Matcher::Regex(m) => m.expression(),
        }
    }
}

impl UrlMatcher for Matcher {
    fn matches(&self, url: &str) -> bool {
        match self {
            Matcher::Substring(m) => m.matches(url),
            Matcher::Pattern(m) => m.matches(url),
            Matcher::Regex(m) => m.matches(url),
        }
    }
}
