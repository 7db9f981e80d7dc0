//! American Soundex, used to bucket titles that sound alike and as the weak
//! phonetic-agreement signal. Coarse by design; never a dominant input to
//! scoring.

/// Soundex code of a single word: first letter plus three digits, e.g.
/// "robert" → "R163". Returns `None` when the word contains no ASCII letter.
pub fn soundex(word: &str) -> Option<String> {
    let mut letters = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase());

    let first = letters.next()?;
    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());

    let mut prev_digit = digit_for(first);
    for c in letters {
        match digit_for(c) {
            Some(d) => {
                if prev_digit != Some(d) {
                    code.push(d);
                    if code.len() == 4 {
                        break;
                    }
                }
                prev_digit = Some(d);
            }
            None => {
                // 'h' and 'w' are transparent: a repeated code across them
                // still counts as one. Vowels break a run.
                if !matches!(c, 'h' | 'w') {
                    prev_digit = None;
                }
            }
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    Some(code)
}

fn digit_for(c: char) -> Option<char> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_reference_codes() {
        assert_eq!(soundex("robert").as_deref(), Some("R163"));
        assert_eq!(soundex("rupert").as_deref(), Some("R163"));
        assert_eq!(soundex("ashcraft").as_deref(), Some("A261"));
        assert_eq!(soundex("ashcroft").as_deref(), Some("A261"));
        assert_eq!(soundex("tymczak").as_deref(), Some("T522"));
        assert_eq!(soundex("pfister").as_deref(), Some("P236"));
        assert_eq!(soundex("honeyman").as_deref(), Some("H555"));
    }

    #[test]
    fn pads_short_words_with_zeros() {
        assert_eq!(soundex("lee").as_deref(), Some("L000"));
        assert_eq!(soundex("a").as_deref(), Some("A000"));
    }

    #[test]
    fn sound_alike_titles_share_a_code() {
        assert_eq!(soundex("gatsby"), soundex("gatsbee"));
        assert_eq!(soundex("smith"), soundex("smyth"));
    }

    #[test]
    fn first_letter_is_kept_verbatim() {
        // plain Soundex never merges across differing initials
        assert_ne!(soundex("philosophy"), soundex("filosofy"));
        assert_eq!(soundex("philosophy").as_deref(), Some("P421"));
        assert_eq!(soundex("filosofy").as_deref(), Some("F421"));
    }

    #[test]
    fn no_letters_yields_none() {
        assert_eq!(soundex("1984"), None);
        assert_eq!(soundex(""), None);
        assert_eq!(soundex("#42"), None);
    }
}
