//! Local, network-free decisions about a single cell's text.
//!
//! Everything here runs before the gateway is consulted, so a cell that is a
//! URL, a product code or an already bilingual pair never costs an API call.

use crate::utils::{GatewayError, UnknownLanguagePolicy};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
    Unknown,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Zh => write!(f, "zh"),
            Language::En => write!(f, "en"),
            Language::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationOutcome {
    SkipSpecial,
    SkipAlreadyTranslated,
    /// Carries a failure marker from an earlier run.
    SkipPreviouslyFailed,
    Translate { from: Language, to: Language },
    SkipUnknown,
}

// Every pattern is anchored at the start only; trailing text is allowed unless
// the pattern itself ends with `$`. A `$` pattern also accepts one trailing
// newline, see `is_special_format`.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+").expect("valid url pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+").expect("valid email pattern"));
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid digits pattern"));
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]+([-_*./\\][A-Za-z0-9]+)*$").expect("valid code pattern")
});
static DATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}",
        r"^\d{2}/\d{2}/\d{4}",
        r"^\d{4}/\d{2}/\d{2}",
        r"^\d{2}-\d{2}-\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid date pattern"))
    .collect()
});

/// Letters beyond this count in a mixed CJK/Latin string mark it as bilingual.
const MIXED_LATIN_THRESHOLD: usize = 5;

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_cjk) {
        Language::Zh
    } else if text.chars().any(|c| c.is_ascii_alphabetic()) {
        Language::En
    } else {
        Language::Unknown
    }
}

pub fn is_special_format(text: &str) -> bool {
    if URL_RE.is_match(text) || EMAIL_RE.is_match(text) {
        return true;
    }

    let body = text.strip_suffix('\n').unwrap_or(text);
    if DIGITS_RE.is_match(body) || CODE_RE.is_match(body) {
        return true;
    }

    if text.chars().any(is_cjk) {
        let latin = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
        if latin > MIXED_LATIN_THRESHOLD {
            return true;
        }
    }

    DATE_RES.iter().any(|re| re.is_match(text))
}

/// A cell holding `original\ntranslation` from an earlier run.
pub fn is_already_translated(text: &str) -> bool {
    let Some((first, second)) = text.split_once('\n') else {
        return false;
    };

    if first.trim().is_empty() || second.trim().is_empty() {
        return false;
    }

    matches!(
        (detect_language(first), detect_language(second)),
        (Language::Zh, Language::En) | (Language::En, Language::Zh)
    )
}

/// A cell written by a failed earlier run: `original\n[marker] original`.
pub fn has_failure_marker(text: &str) -> bool {
    text.split_once('\n')
        .is_some_and(|(_, rest)| GatewayError::is_marker(rest.trim_start()))
}

/// Earlier-run checks come first so re-runs report the real reason a cell was
/// left alone; every skip outcome leaves the cell untouched.
pub fn classify(text: &str, policy: UnknownLanguagePolicy) -> ClassificationOutcome {
    if has_failure_marker(text) {
        return ClassificationOutcome::SkipPreviouslyFailed;
    }

    if is_already_translated(text) {
        return ClassificationOutcome::SkipAlreadyTranslated;
    }

    if is_special_format(text) {
        return ClassificationOutcome::SkipSpecial;
    }

    match detect_language(text) {
        Language::Zh => ClassificationOutcome::Translate {
            from: Language::Zh,
            to: Language::En,
        },
        Language::En => ClassificationOutcome::Translate {
            from: Language::En,
            to: Language::Zh,
        },
        Language::Unknown => match policy {
            UnknownLanguagePolicy::TranslateToEnglish => ClassificationOutcome::Translate {
                from: Language::Unknown,
                to: Language::En,
            },
            UnknownLanguagePolicy::Skip => ClassificationOutcome::SkipUnknown,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_wins_over_latin() {
        assert_eq!(detect_language("你好"), Language::Zh);
        assert_eq!(detect_language("hello 世界"), Language::Zh);
        assert_eq!(detect_language("ABC项目XYZ"), Language::Zh);
    }

    #[test]
    fn detects_english_and_unknown() {
        assert_eq!(detect_language("hello"), Language::En);
        assert_eq!(detect_language("x = 1"), Language::En);
        assert_eq!(detect_language("12,5 %"), Language::Unknown);
        assert_eq!(detect_language("안녕하세요"), Language::Unknown);
        assert_eq!(detect_language(""), Language::Unknown);
    }

    #[test]
    fn special_formats() {
        assert!(is_special_format("https://example.com"));
        assert!(is_special_format("http://a.b/c?d=1 trailing words"));
        assert!(is_special_format("someone@example.com"));
        assert!(is_special_format("12345"));
        assert!(is_special_format("12325-D-3221"));
        assert!(is_special_format("302*302"));
        assert!(is_special_format("ABC-123-XYZ"));
        assert!(is_special_format("path/to\\file.txt"));
        assert!(is_special_format("hello"));
        assert!(is_special_format("2024-01-31"));
        assert!(is_special_format("01/31/2024 10:00"));
        assert!(is_special_format("2024/01/31"));
        assert!(is_special_format("01-31-2024"));
        assert!(is_special_format("项目 Project plan"));
    }

    #[test]
    fn anchored_patterns_accept_one_trailing_newline() {
        assert!(is_special_format("12345\n"));
        assert!(is_special_format("ABC-123\n"));
        assert!(!is_special_format("12345\n\n"));
        assert!(!is_special_format("12345\nmore"));
    }

    #[test]
    fn ordinary_text_is_not_special() {
        assert!(!is_special_format("你好"));
        assert!(!is_special_format("hello world"));
        assert!(!is_special_format("项目ABC"));
        assert!(!is_special_format("ftp://example.com"));
        assert!(!is_special_format("12 apples"));
        assert!(!is_special_format("-leading dash"));
    }

    #[test]
    fn already_translated_pairs() {
        assert!(is_already_translated("你好\nhello"));
        assert!(is_already_translated("hello\n你好"));
        assert!(is_already_translated("项目\nProject\nextra line"));
        assert!(!is_already_translated("你好"));
        assert!(!is_already_translated("hello\nworld"));
        assert!(!is_already_translated("你好\n世界"));
        assert!(!is_already_translated("你好\n   "));
        assert!(!is_already_translated("\nhello"));
        assert!(!is_already_translated("123\n456"));
    }

    #[test]
    fn classify_follows_check_order() {
        let policy = UnknownLanguagePolicy::TranslateToEnglish;
        assert_eq!(classify("https://x.y", policy), ClassificationOutcome::SkipSpecial);
        assert_eq!(
            classify("你好\nhi", policy),
            ClassificationOutcome::SkipAlreadyTranslated
        );
        assert_eq!(
            classify("你好", policy),
            ClassificationOutcome::Translate {
                from: Language::Zh,
                to: Language::En
            }
        );
        assert_eq!(
            classify("good morning", policy),
            ClassificationOutcome::Translate {
                from: Language::En,
                to: Language::Zh
            }
        );
    }

    #[test]
    fn earlier_failures_are_never_resent() {
        let policy = UnknownLanguagePolicy::TranslateToEnglish;
        assert!(has_failure_marker("good morning\n[Translation timeout] good morning"));
        assert!(has_failure_marker("你好\n[Translation error: 54003] 你好"));
        assert!(!has_failure_marker("good morning"));
        assert!(!has_failure_marker("[Network error] first line only"));
        assert_eq!(
            classify("good morning\n[Network error] good morning", policy),
            ClassificationOutcome::SkipPreviouslyFailed
        );
    }

    #[test]
    fn long_bilingual_pairs_count_as_translated() {
        let policy = UnknownLanguagePolicy::TranslateToEnglish;
        assert!(is_special_format("Hello world\n你好世界"));
        assert_eq!(
            classify("Hello world\n你好世界", policy),
            ClassificationOutcome::SkipAlreadyTranslated
        );
    }

    #[test]
    fn unknown_language_follows_policy() {
        assert_eq!(
            classify("안녕하세요", UnknownLanguagePolicy::TranslateToEnglish),
            ClassificationOutcome::Translate {
                from: Language::Unknown,
                to: Language::En
            }
        );
        assert_eq!(
            classify("안녕하세요", UnknownLanguagePolicy::Skip),
            ClassificationOutcome::SkipUnknown
        );
    }
}
