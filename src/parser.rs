use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FilterError, Result};
use crate::types::{RuleKind, TextRule};

/// Element hiding separators: `##`, `#@#`, `#?#`, `#@?#`, `#$#`, `#@$#`, `#%#`, `#@%#`
static COSMETIC_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#@?[?$%]?#").expect("COSMETIC_SEPARATOR: hardcoded regex is invalid")
});

/// Line breaks accepted in filter list text
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\n|\r").expect("LINE_BREAK: hardcoded regex is invalid"));

const EXCEPTION_MARKER: &str = "@@";
const LIST_HEADER_PREFIX: &str = "[adblock";

/// Split filter list text into lines, accepting `\r\n`, `\n` and `\r`.
pub fn split_lines(text: &str) -> Vec<String> {
    LINE_BREAK.split(text).map(String::from).collect()
}

/// Parse and classify a single filter line.
///
/// Classification order: empty, comment/header, cosmetic, exception, blocking.
/// For exception and blocking rules the `@@` marker and the `$`-options block
/// are removed from `pattern`; the option tokens are kept on the rule.
pub fn parse_rule(line: &str) -> Result<TextRule> {
    let line = line.trim();

    if line.is_empty() {
        return Err(FilterError::invalid_rule(line, "empty rule"));
    }

    if line.starts_with('!') || is_list_header(line) {
        return Ok(non_matchable(RuleKind::Comment, line));
    }

    if COSMETIC_SEPARATOR.is_match(line) {
        return Ok(non_matchable(RuleKind::Html, line));
    }

    let (kind, body) = match line.strip_prefix(EXCEPTION_MARKER) {
        Some(rest) => (RuleKind::Exception, rest.trim_start()),
        None => (RuleKind::Blocking, line),
    };

    let (pattern, options) = split_options(body, line)?;
    if pattern.is_empty() {
        return Err(FilterError::invalid_rule(line, "empty pattern"));
    }

    Ok(TextRule {
        kind,
        pattern: pattern.to_string(),
        options,
        source: line.to_string(),
    })
}

/// Whether a pattern is an inline regular expression (`/.../`)
pub fn is_regex_pattern(pattern: &str) -> bool {
    pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/')
}

fn is_list_header(line: &str) -> bool {
    line.get(..LIST_HEADER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(LIST_HEADER_PREFIX))
}

fn non_matchable(kind: RuleKind, line: &str) -> TextRule {
    TextRule {
        kind,
        pattern: String::new(),
        options: Vec::new(),
        source: line.to_string(),
    }
}

/// Separate the pattern from its `$`-options block.
fn split_options<'a>(body: &'a str, line: &str) -> Result<(&'a str, Vec<String>)> {
    if body.starts_with('/') && body.len() > 1 {
        // `$` inside `/.../` belongs to the regex; options may only follow the closing slash
        if let Some(close) = body.rfind('/').filter(|&pos| pos > 0) {
            let tail = &body[close + 1..];
            if tail.is_empty() {
                return Ok((body, Vec::new()));
            }
            if let Some(options) = tail.strip_prefix('$') {
                return Ok((&body[..=close], split_option_tokens(options)));
            }
        }

        if body.ends_with('$') {
            return Err(FilterError::invalid_rule(
                line,
                "unterminated regular expression",
            ));
        }
    }

    match body.rfind('$') {
        Some(pos) => Ok((body[..pos].trim_end(), split_option_tokens(&body[pos + 1..]))),
        None => Ok((body, Vec::new())),
    }
}

fn split_option_tokens(options: &str) -> Vec<String> {
    options
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}
