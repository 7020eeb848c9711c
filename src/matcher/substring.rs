use super::UrlMatcher;

/// Case-insensitive containment matcher for patterns without wildcards or anchors
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    needle: String,
}

impl SubstringMatcher {
    /// Create a new substring matcher
    pub fn new(pattern: &str) -> Self {
        Self {
            needle: pattern.to_lowercase(),
        }
    }

    /// The lowercased literal
    pub fn needle(&self) -> &str {
        &self.needle
    }
}

impl UrlMatcher for SubstringMatcher {
    fn matches(&self, url: &str) -> bool {
        // Only allocate when the URL actually has uppercase characters
        if url.chars().any(char::is_uppercase) {
            url.to_lowercase().contains(&self.needle)
        } else {
            url.contains(&self.needle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let matcher = SubstringMatcher::new("/banner/");

        assert!(matcher.matches("http://example.com/banner/top.gif"));
        assert!(!matcher.matches("http://example.com/banners.gif"));
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = SubstringMatcher::new("AdServer");

        assert!(matcher.matches("http://example.com/adserver.js"));
        assert!(matcher.matches("http://example.com/ADSERVER.js"));
        assert!(!matcher.matches("http://example.com/ad-server.js"));
    }
}
