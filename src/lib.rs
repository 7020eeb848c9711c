//! Adblock Engine - an Adblock Plus filter list compiler and URL matching engine for Rust
//!
//! This library classifies URLs as blocked or allowed against Adblock Plus
//! style filter rules:
//! - Plain substring patterns
//! - Wildcards (`*`) and separators (`^`)
//! - Start (`|`), end (`|`) and domain (`||`) anchors
//! - Inline regular expressions (`/.../`)
//! - Exception rules (`@@`) that always take precedence
//! - Comments and cosmetic rules, which are kept but never match URLs
//!
//! # Example
//!
//! ```rust
//! use adblock_engine_r::{AdblockEngine, EngineOptions};
//!
//! let rules = [
//!     "! EasyList excerpt",
//!     "||ads.example.com^",
//!     "@@||ads.example.com/safe.js|",
//!     "example.com##.banner",
//! ];
//!
//! let engine = AdblockEngine::from_rules(rules, EngineOptions::default());
//!
//! assert!(engine.should_block("http://ads.example.com/banner.js").unwrap());
//! assert!(!engine.should_block("http://ads.example.com/safe.js").unwrap());
//! assert!(engine.should_block("not a url").is_err());
//! ```
//!
//! # Rule Syntax
//!
//! | Syntax | Example | Meaning |
//! |--------|---------|---------|
//! | `!` | `! comment` | Comment |
//! | `##`, `#@#`, ... | `example.com##.ad` | Cosmetic rule (ignored for URLs) |
//! | `@@` | `@@/ads/allowed.js` | Exception |
//! | `\|\|` | `\|\|ads.example.com^` | Domain anchor |
//! | `\|` | `\|http://example.com/ad\|` | Start / end anchor |
//! | `*` | `/banner*.gif` | Any characters |
//! | `^` | `example.com^` | Separator or end of URL |
//! | `/.../` | `/banner\d+\.gif/` | Regular expression |
//! | `$...` | `\|\|a.com^$script` | Options (kept, not enforced) |

pub mod cache;
pub mod compile;
pub mod engine;
pub mod error;
pub mod list;
pub mod matcher;
pub mod parser;
pub mod types;

// Re-export commonly used items
pub use cache::{batch_hash, MemoryResultCache, NilResultCache, ResultCache};
pub use compile::{
    compile_rule, compile_rules, CompileReport, CompiledBatch, FilterRule, RuleSet, SkippedRule,
    DEFAULT_CACHE_SIZE,
};
pub use engine::{AdblockEngine, EngineOptions};
pub use error::{FilterError, LoadErrorKind, Result};
#[cfg(feature = "download")]
pub use list::AutoListLoader;
pub use list::{FileListLoader, ListLoader, MemoryListLoader, NilListLoader, DEFAULT_UPDATE_INTERVAL};
pub use matcher::{Matcher, PatternMatcher, RegexMatcher, SubstringMatcher, UrlMatcher};
pub use parser::{parse_rule, split_lines};
pub use types::{MatchResult, RuleKind, TextRule};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_workflow() {
        let list = r#"[Adblock Plus 2.0]
! Title: Test list
||ads.example.com^
/banner*.gif$
|http://example.com/ad|
example.com##.sidebar-ad
@@||ads.example.com/safe.js|
"#;

        let lines = split_lines(list);
        let engine = AdblockEngine::new(EngineOptions::default());
        let report = engine.add_rules(&lines);

        // header, comment, 2 blocking, cosmetic, exception
        assert_eq!(report.compiled, 6);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].text, "/banner*.gif$");

        // Exception sorted first
        assert!(engine.rules()[0].is_exception());

        assert!(engine.should_block("http://ads.example.com/banner.js").unwrap());
        assert!(!engine.should_block("http://ads.example.com/safe.js").unwrap());
        assert!(engine.should_block("http://example.com/ad").unwrap());
        assert!(!engine.should_block("http://example.com/ad2").unwrap());
        assert!(!engine.should_block("http://example.com/banner1.gif").unwrap());
        assert!(!engine.should_block("http://example.com/sidebar-ad").unwrap());
    }
}
