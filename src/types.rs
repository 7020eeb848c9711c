/// Rule classification, decided once when a line is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// `! ...` comment or `[Adblock ...]` list header
    Comment,
    /// Element hiding / cosmetic rule (`##`, `#@#`, ...)
    Html,
    /// Plain blocking rule
    Blocking,
    /// `@@` exception rule
    Exception,
}

impl RuleKind {
    /// Whether rules of this kind are evaluated against URLs
    pub fn is_matchable(&self) -> bool {
        matches!(self, RuleKind::Blocking | RuleKind::Exception)
    }
}

/// Parsed text rule before compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    /// Rule classification
    pub kind: RuleKind,
    /// Pattern text with the `@@` marker and the `$`-options block removed.
    /// Empty for comments and cosmetic rules.
    pub pattern: String,
    /// Raw `$`-option tokens, preserved but never enforced
    pub options: Vec<String>,
    /// The trimmed original line
    pub source: String,
}

/// The rule that decided a URL query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Either `Blocking` or `Exception`
    pub kind: RuleKind,
    /// Source text of the deciding rule
    pub rule: String,
}

impl MatchResult {
    /// True when the deciding rule blocks the request
    pub fn is_blocked(&self) -> bool {
        self.kind == RuleKind::Blocking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchable_kinds() {
        assert!(RuleKind::Blocking.is_matchable());
        assert!(RuleKind::Exception.is_matchable());
        assert!(!RuleKind::Comment.is_matchable());
        assert!(!RuleKind::Html.is_matchable());
    }

    #[test]
    fn test_match_result_is_blocked() {
        let blocked = MatchResult {
            kind: RuleKind::Blocking,
            rule: "||ads.example.com^".into(),
        };
        let allowed = MatchResult {
            kind: RuleKind::Exception,
            rule: "@@||ads.example.com/safe.js|".into(),
        };
        assert!(blocked.is_blocked());
        assert!(!allowed.is_blocked());
    }
}
