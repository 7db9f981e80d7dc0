//! Volume/edition marker extraction and the series guard.
//!
//! Consecutive volumes of a series ("Mystery Series Book 1" / "Book 2") are
//! textually near-identical and are the single largest source of false
//! positives in naive title matching. The guard recognizes a small marker
//! grammar and blocks pairs whose markers differ while their bases match.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::similarity;
use crate::types::{NormalizedItem, SeriesToken};

/// "book 3", "vol 3" / "volume 3", "part 3", "no 3" — numeric index after a
/// cue word. Input is already canonicalized, so "Vol. 3" arrives as "vol 3".
static CUE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:book|volume|vol|part|no|number)\s+(\d{1,3})\b").unwrap());

/// Roman index after a cue word: "part ii", "volume iv".
static CUE_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:book|volume|vol|part)\s+([ivxlcdm]+)\b").unwrap());

/// Trailing roman numeral with no cue: "rocky iv". Single letters are
/// excluded ("malcolm x") and values above 50 are rejected so ordinary words
/// built from roman letters ("mix", "mild") do not match.
static TRAILING_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s([ivxlcdm]{2,6})$").unwrap());

/// Trailing standalone small integer: "dune 2". Covers "#2" as well, since
/// canonicalization reduces it to a bare trailing number. Four-digit years
/// never reach this rule; the normalizer strips them as noise first.
static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s(\d{1,3})$").unwrap());

const MAX_TRAILING_ROMAN: u32 = 50;

/// Bases must be this close before differing markers are trusted to mean
/// "same series, different entries".
const BASE_SIMILARITY_FLOOR: f64 = 0.85;

/// Recognize a series marker in a canonicalized title. Returns the token and
/// the base title with the marker stripped; `(None, title)` when nothing in
/// the grammar matches.
pub fn extract(title: &str) -> (Option<SeriesToken>, String) {
    if let Some(caps) = CUE_NUMBER.captures(title) {
        let m = caps.get(0).unwrap();
        if let Ok(number) = caps[1].parse::<u32>() {
            return (
                Some(SeriesToken {
                    source: m.as_str().to_string(),
                    number,
                }),
                strip_range(title, m.start(), m.end()),
            );
        }
    }

    if let Some(caps) = CUE_ROMAN.captures(title) {
        let m = caps.get(0).unwrap();
        if let Some(number) = roman_value(&caps[1]) {
            return (
                Some(SeriesToken {
                    source: m.as_str().to_string(),
                    number,
                }),
                strip_range(title, m.start(), m.end()),
            );
        }
    }

    if let Some(caps) = TRAILING_ROMAN.captures(title) {
        let token = caps.get(1).unwrap();
        if let Some(number) = roman_value(token.as_str()).filter(|n| *n <= MAX_TRAILING_ROMAN) {
            return (
                Some(SeriesToken {
                    source: token.as_str().to_string(),
                    number,
                }),
                strip_range(title, token.start(), token.end()),
            );
        }
    }

    if let Some(caps) = TRAILING_NUMBER.captures(title) {
        let token = caps.get(1).unwrap();
        if let Ok(number) = token.as_str().parse::<u32>() {
            if number >= 1 {
                return (
                    Some(SeriesToken {
                        source: token.as_str().to_string(),
                        number,
                    }),
                    strip_range(title, token.start(), token.end()),
                );
            }
        }
    }

    (None, title.to_string())
}

/// The guard fires only when both items carry a recognized marker, the
/// markers name different entries, and the stripped bases are near-identical.
/// A missing marker on either side means the evidence is too weak to block.
pub fn guard_triggered(a: &NormalizedItem, b: &NormalizedItem) -> bool {
    match (&a.series_token, &b.series_token) {
        (Some(ta), Some(tb)) if ta.number != tb.number => {
            similarity::edit_distance_ratio(&a.series_base, &b.series_base)
                >= BASE_SIMILARITY_FLOOR
        }
        _ => false,
    }
}

fn strip_range(title: &str, start: usize, end: usize) -> String {
    let mut base = String::with_capacity(title.len());
    base.push_str(&title[..start]);
    base.push(' ');
    base.push_str(&title[end..]);
    base.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn roman_value(s: &str) -> Option<u32> {
    fn digit(c: char) -> u32 {
        match c {
            'i' => 1,
            'v' => 5,
            'x' => 10,
            'l' => 50,
            'c' => 100,
            'd' => 500,
            'm' => 1000,
            _ => 0,
        }
    }

    if s.is_empty() {
        return None;
    }
    let values: Vec<u32> = s.chars().map(digit).collect();
    let mut total: i64 = 0;
    for (idx, value) in values.iter().enumerate() {
        if values[idx + 1..].iter().any(|later| later > value) {
            total -= i64::from(*value);
        } else {
            total += i64::from(*value);
        }
    }
    u32::try_from(total).ok().filter(|v| *v >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_item;
    use crate::types::CatalogItem;

    fn norm(title: &str) -> NormalizedItem {
        normalize_item(&CatalogItem::new("t", title)).unwrap()
    }

    #[test]
    fn extracts_book_number() {
        let (token, base) = extract("mystery series book 1");
        assert_eq!(token.unwrap().number, 1);
        assert_eq!(base, "mystery series");
    }

    #[test]
    fn extracts_volume_and_part_markers() {
        let (token, base) = extract("foundation vol 3");
        assert_eq!(token.unwrap().number, 3);
        assert_eq!(base, "foundation");

        let (token, base) = extract("the two towers part ii");
        assert_eq!(token.unwrap().number, 2);
        assert_eq!(base, "the two towers");
    }

    #[test]
    fn extracts_trailing_roman_numeral() {
        let (token, base) = extract("rocky iv");
        assert_eq!(token.unwrap().number, 4);
        assert_eq!(base, "rocky");
    }

    #[test]
    fn extracts_trailing_integer() {
        let (token, base) = extract("dune 2");
        assert_eq!(token.unwrap().number, 2);
        assert_eq!(base, "dune");
    }

    #[test]
    fn single_roman_letter_is_not_a_marker() {
        let (token, base) = extract("malcolm x");
        assert!(token.is_none());
        assert_eq!(base, "malcolm x");
    }

    #[test]
    fn roman_looking_words_are_rejected_by_value_cap() {
        // "mix" parses as 1009, far past any plausible series index
        let (token, _) = extract("the mix");
        assert!(token.is_none());
    }

    #[test]
    fn roman_parser_handles_subtractive_forms() {
        assert_eq!(roman_value("iv"), Some(4));
        assert_eq!(roman_value("ix"), Some(9));
        assert_eq!(roman_value("xiv"), Some(14));
        assert_eq!(roman_value("xl"), Some(40));
        assert_eq!(roman_value("mix"), Some(1009));
    }

    #[test]
    fn guard_fires_on_differing_markers_with_identical_base() {
        let a = norm("Mystery Series Book 1");
        let b = norm("Mystery Series Book 2");
        assert!(guard_triggered(&a, &b));
        assert!(guard_triggered(&b, &a));
    }

    #[test]
    fn guard_silent_when_marker_missing_on_one_side() {
        let a = norm("Mystery Series Book 1");
        let b = norm("Mystery Series");
        assert!(!guard_triggered(&a, &b));
    }

    #[test]
    fn guard_silent_on_matching_markers() {
        let a = norm("Mystery Series Book 2");
        let b = norm("Mystery Series Book 2");
        assert!(!guard_triggered(&a, &b));
    }

    #[test]
    fn guard_silent_when_bases_differ() {
        let a = norm("Mystery Series Book 1");
        let b = norm("Cooking Compendium Book 2");
        assert!(!guard_triggered(&a, &b));
    }
}
