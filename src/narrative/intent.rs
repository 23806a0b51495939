//! Intent Classifier
//!
//! Fixed keyword matching over diacritic-stripped, lowercased text. Patterns
//! are tried in priority order and the first match wins.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Money,
    Career,
    Health,
    Love,
    Children,
    Future,
    TenRelations,
    Stars,
    General,
}

impl IntentCategory {
    /// Dump categories render structures literally instead of a template.
    pub fn is_dump(self) -> bool {
        matches!(self, IntentCategory::TenRelations | IntentCategory::Stars)
    }
}

lazy_static! {
    static ref PATTERNS: Vec<(IntentCategory, Regex)> = vec![
        (
            IntentCategory::Money,
            Regex::new(r"\b(tien bac|tien tai|kiem tien|tai chinh|tai loc|giau|thu nhap|dau tu|money|wealth|finance|financial|income|invest\w*|rich)\b").unwrap(),
        ),
        (
            IntentCategory::Career,
            Regex::new(r"\b(su nghiep|cong viec|nghe nghiep|thang tien|viec lam|kinh doanh|career|job|work|promotion|business)\b").unwrap(),
        ),
        (
            IntentCategory::Health,
            Regex::new(r"\b(suc khoe|benh\w*|om dau|health|healthy|sick\w*|illness)\b").unwrap(),
        ),
        (
            IntentCategory::Love,
            Regex::new(r"\b(tinh yeu|tinh duyen|hon nhan|vo chong|nguoi yeu|ket hon|lay chong|lay vo|cuoi vo|cuoi chong|dam cuoi|love|marriage|married|wedding|relationship|romance|partner)\b").unwrap(),
        ),
        (
            IntentCategory::Children,
            Regex::new(r"\b(con cai|con chau|sinh con|children|child|kids?|pregnan\w*)\b").unwrap(),
        ),
        (
            IntentCategory::Future,
            Regex::new(r"\b(tuong lai|van menh|cuoc doi|van han|du doan|future|destiny|fate|forecast|life path)\b").unwrap(),
        ),
        (
            IntentCategory::TenRelations,
            Regex::new(r"\b(thap than|thap tinh|ten gods?|ten relations?)\b").unwrap(),
        ),
        (
            IntentCategory::Stars,
            Regex::new(r"\b(than sat|cac sao|ngoi sao|nhung sao|sao gi|sao nao|co sao|stars?)\b").unwrap(),
        ),
    ];
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
}

/// A keyword whose diacritic-free spelling collides with unrelated words
/// (`tiền` money vs `tiến` advance, `cưới` wed vs `cuối` end).
struct MarkedWord {
    category: IntentCategory,
    /// Lowercase NFC spelling; always counts.
    marked: &'static str,
    /// Plain spelling, or `None` when it is too ambiguous to count.
    plain: Option<&'static str>,
    /// Folded words that cancel a plain match when directly before it.
    not_after: &'static [&'static str],
}

const MARKED_WORDS: &[MarkedWord] = &[
    MarkedWord {
        category: IntentCategory::Money,
        marked: "tiền",
        plain: Some("tien"),
        not_after: &["thang"],
    },
    MarkedWord {
        category: IntentCategory::Love,
        marked: "cưới",
        plain: None,
        not_after: &[],
    },
];

/// Whole words of `text`, each as (lowercase NFC, folded).
fn words(text: &str) -> Vec<(String, String)> {
    let lowered: String = text.to_lowercase().nfc().collect();
    WORD.find_iter(&lowered)
        .map(|m| (m.as_str().to_string(), normalize(m.as_str())))
        .collect()
}

fn mentions(entry: &MarkedWord, words: &[(String, String)]) -> bool {
    words.iter().enumerate().any(|(i, (word, _))| {
        if word == entry.marked {
            return true;
        }
        let plain = entry.plain.is_some_and(|p| word == p);
        let cancelled = i > 0 && entry.not_after.contains(&words[i - 1].1.as_str());
        plain && !cancelled
    })
}

/// Lowercase, decompose, and drop combining marks (`đ` folds to `d`).
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == 'đ' { 'd' } else { c })
        .collect()
}

/// Classify free text into a topic.
pub fn classify(text: &str) -> IntentCategory {
    let normalized = normalize(text);
    let words = words(text);
    let category = PATTERNS
        .iter()
        .find(|(category, pattern)| {
            pattern.is_match(&normalized)
                || MARKED_WORDS
                    .iter()
                    .any(|entry| entry.category == *category && mentions(entry, &words))
        })
        .map(|(category, _)| *category)
        .unwrap_or(IntentCategory::General);
    debug!("classified query as {:?}", category);
    category
}
