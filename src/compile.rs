use std::num::NonZeroUsize;

use parking_lot::Mutex;

use lru::LruCache;
use url::Url;

use crate::error::{FilterError, Result};
use crate::matcher::{Matcher, PatternMatcher, RegexMatcher, SubstringMatcher, UrlMatcher};
use crate::parser::{is_regex_pattern, parse_rule};
use crate::types::{MatchResult, RuleKind, TextRule};

/// Default LRU cache size for URL decisions
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Cache value type: the deciding rule, or `None` for the default allow
type CacheValue = Option<MatchResult>;

/// A compiled filter rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct FilterRule {
    kind: RuleKind,
    matcher: Option<Matcher>,
    options: Vec<String>,
    source: String,
}

impl FilterRule {
    /// Rule classification
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_exception(&self) -> bool {
        self.kind == RuleKind::Exception
    }

    pub fn is_comment(&self) -> bool {
        self.kind == RuleKind::Comment
    }

    pub fn is_html(&self) -> bool {
        self.kind == RuleKind::Html
    }

    /// URL matcher; `None` for comments and cosmetic rules
    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    /// Raw `$`-option tokens. They are kept for inspection and never enforced.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The trimmed original line
    pub fn source_text(&self) -> &str {
        &self.source
    }

    /// Check if this rule matches the URL. Comments and cosmetic rules never match.
    pub fn matches(&self, url: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.matches(url))
    }
}

/// A line that failed to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    /// 1-based position of the line in its batch
    pub line_num: usize,
    /// The offending line, trimmed
    pub text: String,
    /// Why the line was rejected
    pub reason: String,
}

/// Result of compiling a batch of lines
#[derive(Debug, Clone, Default)]
pub struct CompiledBatch {
    /// Successfully compiled rules, in input order
    pub rules: Vec<FilterRule>,
    /// Lines rejected as invalid rules
    pub skipped: Vec<SkippedRule>,
}

impl CompiledBatch {
    /// Summary of this batch
    pub fn report(&self) -> CompileReport {
        CompileReport {
            compiled: self.rules.len(),
            skipped: self.skipped.clone(),
        }
    }
}

/// Summary returned by `add_rules`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Number of rules added
    pub compiled: usize,
    /// Lines that were dropped
    pub skipped: Vec<SkippedRule>,
}

/// Compile a single filter line
pub fn compile_rule(line: &str) -> Result<FilterRule> {
    let rule = parse_rule(line)?;

    let matcher = if rule.kind.is_matchable() {
        Some(compile_matcher(&rule)?)
    } else {
        None
    };

    Ok(FilterRule {
        kind: rule.kind,
        matcher,
        options: rule.options,
        source: rule.source,
    })
}

/// Compile a batch of lines. Invalid lines are collected in `skipped`;
/// blank lines are dropped without a report entry.
pub fn compile_rules<I, S>(lines: I) -> CompiledBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let batch = lines
        .into_iter()
        .enumerate()
        .fold(CompiledBatch::default(), |mut batch, (idx, line)| {
            let line = line.as_ref();
            if line.trim().is_empty() {
                return batch;
            }

            match compile_rule(line) {
                Ok(rule) => batch.rules.push(rule),
                Err(e) => {
                    let reason = match e {
                        FilterError::InvalidRule { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    log::debug!("skipping invalid rule at line {}: {:?} ({})", idx + 1, line, reason);
                    batch.skipped.push(SkippedRule {
                        line_num: idx + 1,
                        text: line.trim().to_string(),
                        reason,
                    });
                }
            }
            batch
        });

    log::debug!(
        "compiled {} rules, skipped {}",
        batch.rules.len(),
        batch.skipped.len()
    );
    batch
}

/// Build the URL matcher for a blocking or exception rule
fn compile_matcher(rule: &TextRule) -> Result<Matcher> {
    let pattern = rule.pattern.as_str();

    if pattern == "//" {
        return Err(FilterError::invalid_rule(
            &rule.source,
            "empty regular expression",
        ));
    }

    if is_regex_pattern(pattern) {
        return RegexMatcher::new(pattern)
            .map(Matcher::Regex)
            .map_err(|e| FilterError::invalid_rule(&rule.source, e.to_string()));
    }

    if pattern.trim_matches('|').is_empty() {
        return Err(FilterError::invalid_rule(
            &rule.source,
            "pattern has no content besides anchors",
        ));
    }

    if !pattern.contains(|c| matches!(c, '*' | '^' | '|')) {
        return Ok(Matcher::Substring(SubstringMatcher::new(pattern)));
    }

    PatternMatcher::new(pattern)
        .map(Matcher::Pattern)
        .map_err(|e| FilterError::invalid_rule(&rule.source, e.to_string()))
}

/// Validate a query URL: trimmed, absolute, with a non-empty host
fn validate_url(url: &str) -> Result<&str> {
    let url = url.trim();
    let parsed = Url::parse(url).map_err(|e| FilterError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(FilterError::InvalidUrl(format!("{}: missing host", url))),
    }
}

/// Ordered rule collection with exception rules first and LRU caching of decisions
pub struct RuleSet {
    rules: Vec<FilterRule>,
    cache: Mutex<LruCache<String, CacheValue>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new(cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            rules: Vec::new(),
            cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Create a rule set from filter lines
    pub fn from_lines<I, S>(lines: I, cache_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rule_set = Self::new(cache_size);
        rule_set.add_rules(lines);
        rule_set
    }

    /// Compile and add filter lines, skipping invalid ones
    pub fn add_rules<I, S>(&mut self, lines: I) -> CompileReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = compile_rules(lines);
        let report = batch.report();
        self.extend(batch.rules);
        report
    }

    /// Add compiled rules and restore the exceptions-first order
    pub fn extend<I>(&mut self, rules: I)
    where
        I: IntoIterator<Item = FilterRule>,
    {
        self.rules.extend(rules);
        // Stable: insertion order is kept within each group
        self.rules.sort_by_key(|rule| !rule.is_exception());
        self.cache.get_mut().clear();
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Get the number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the rule that decides this URL
    pub fn match_url(&self, url: &str) -> Result<Option<MatchResult>> {
        let url = validate_url(url)?;

        if let Some(cached) = self.cache.lock().get(url) {
            return Ok(cached.clone());
        }

        // Scan without holding the cache lock
        let result = self.find_match(url);
        self.cache.lock().put(url.to_string(), result.clone());

        Ok(result)
    }

    /// Check if the URL should be blocked
    pub fn should_block(&self, url: &str) -> Result<bool> {
        Ok(self.match_url(url)?.is_some_and(|m| m.is_blocked()))
    }

    /// Negation of [`RuleSet::should_block`]
    pub fn should_not_block(&self, url: &str) -> Result<bool> {
        self.should_block(url).map(|blocked| !blocked)
    }

    /// Clear the decision cache
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
    }

    /// First matching rule wins; no match means allow.
    fn find_match(&self, url: &str) -> Option<MatchResult> {
        self.rules
            .iter()
            .find(|rule| rule.matches(url))
            .map(|rule| MatchResult {
                kind: rule.kind,
                rule: rule.source.clone(),
            })
    }
}
