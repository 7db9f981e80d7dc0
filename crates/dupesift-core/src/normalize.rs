//! Canonicalization of raw catalog fields into comparable form.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::phonetic::soundex;
use crate::series;
use crate::types::{CatalogItem, NormalizedItem, Warning, WarningReason};

/// Words that do not count as "significant" for phonetic keys and bucketing.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "or", "in", "on", "to", "for",
];

/// Edition/noise tokens that say nothing about which work a title names.
/// Canonicalization has already removed dots, so "2nd ed." arrives "2nd ed".
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:revised|updated|new) edition|revised|updated|\d{1,2}(?:st|nd|rd|th) ed(?:ition)?|edition)\b",
    )
    .unwrap()
});

/// Trailing standalone publication year. Only trailing: a leading or lone
/// year ("1984", "2001 a space odyssey") is part of the title itself.
static TRAILING_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s(?:19|20)\d{2}$").unwrap());

/// Lowercase, strip diacritics (NFD, then drop combining marks), replace
/// punctuation with spaces, collapse runs of whitespace.
pub fn canonicalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalized author with name tokens sorted, so "Fitzgerald, F. Scott"
/// and "F. Scott Fitzgerald" compare equal.
pub fn normalize_author(raw: &str) -> Option<String> {
    let canonical = canonicalize(raw);
    if canonical.is_empty() {
        return None;
    }
    let mut tokens: Vec<&str> = canonical.split(' ').collect();
    tokens.sort_unstable();
    Some(tokens.join(" "))
}

fn strip_noise(title: &str) -> String {
    let cleaned = NOISE.replace_all(title, " ");
    let mut cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    while let Some(start) = TRAILING_YEAR.find(&cleaned).map(|m| m.start()) {
        cleaned.truncate(start);
    }
    if cleaned.is_empty() {
        // Titles made entirely of noise tokens still have to compare as
        // something; keep the canonical form instead.
        title.to_string()
    } else {
        cleaned
    }
}

fn significant_words(title: &str) -> Vec<&str> {
    let significant: Vec<&str> = title
        .split(' ')
        .filter(|w| !STOPWORDS.contains(w))
        .collect();
    if significant.is_empty() {
        title.split(' ').collect()
    } else {
        significant
    }
}

/// Derive the pipeline's view of one item. Soft failure: a missing or
/// unusable title produces a [`Warning`], never an error, and the item is
/// excluded from comparison.
pub fn normalize_item(item: &CatalogItem) -> Result<NormalizedItem, Warning> {
    if item.title.trim().is_empty() {
        return Err(Warning {
            item_id: item.id.clone(),
            reason: WarningReason::MissingTitle,
        });
    }

    let canonical = canonicalize(&item.title);
    if canonical.is_empty() {
        return Err(Warning {
            item_id: item.id.clone(),
            reason: WarningReason::EmptyAfterNormalization,
        });
    }

    let title = strip_noise(&canonical);
    let (series_token, series_base) = series::extract(&title);

    let words = significant_words(&title);
    let first_word = words[0].to_string();
    let phonetic_key = soundex(words[0]);
    let second_phonetic_key = words.get(1).and_then(|w| soundex(w));

    Ok(NormalizedItem {
        item_id: item.id.clone(),
        title,
        series_base,
        series_token,
        author: item.author.as_deref().and_then(normalize_author),
        category: item
            .category
            .as_deref()
            .map(canonicalize)
            .filter(|c| !c.is_empty()),
        phonetic_key,
        second_phonetic_key,
        first_word,
    })
}
