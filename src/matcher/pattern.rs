use regex::{Regex, RegexBuilder};

use super::UrlMatcher;

/// Regex prefix for `||`: start of the URL, or right after `scheme://` and
/// any subdomain labels ending in `.`
pub const DOMAIN_ANCHOR: &str = r"^(?:[^:/?#]+:)?(?://(?:[^/?#]*\.)?)?";

/// Regex for `^`: one character that is not a letter, digit, `_`, `-`, `.`,
/// `%` or a literal `^`, or the end of the URL
pub const SEPARATOR: &str = r"(?:[^\w\-.%^]|$)";

/// Translate an Adblock pattern (options already removed) into a regular expression.
///
/// - `||` prefix becomes [`DOMAIN_ANCHOR`]
/// - `|` prefix becomes `^`, `|` suffix becomes `$`
/// - `*` becomes `.*`, `^` becomes [`SEPARATOR`]
/// - every other character is matched literally, including inner `|`
pub fn translate_pattern(pattern: &str) -> String {
    let mut expr = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    if let Some(stripped) = rest.strip_prefix("||") {
        expr.push_str(DOMAIN_ANCHOR);
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('|') {
        expr.push('^');
        rest = stripped;
    }

    let end_anchor = match rest.strip_suffix('|') {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    let mut literal = String::new();
    for c in rest.chars() {
        let special = match c {
            '*' => ".*",
            '^' => SEPARATOR,
            '|' => r"\|",
            _ => {
                literal.push(c);
                continue;
            }
        };
        if !literal.is_empty() {
            expr.push_str(&regex::escape(&literal));
            literal.clear();
        }
        expr.push_str(special);
    }
    if !literal.is_empty() {
        expr.push_str(&regex::escape(&literal));
    }

    if end_anchor {
        expr.push('$');
    }

    expr
}

/// Matcher for Adblock patterns with wildcards, separators or anchors
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Create a new pattern matcher
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&translate_pattern(pattern))
            .case_insensitive(true)
            .build()?;
        Ok(Self { regex })
    }

    /// The translated regular expression
    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }
}

impl UrlMatcher for PatternMatcher {
    fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}
