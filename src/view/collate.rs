//! Spanish string ordering for province names
//!
//! Orders strings the way a Spanish-locale collator does at base strength:
//! case and accents are ignored for ordering, while `ñ` is a letter of its own
//! between `n` and `o`. This is only used for sorting and never for equality
//! checks.

use std::cmp::Ordering;

/// Combining diacritical marks block
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{300}'..='\u{36F}';
const COMBINING_TILDE: char = '\u{303}';

/// Compares two strings under Spanish base-strength collation
pub fn compare(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Primary weights of a string's characters
///
/// Combining marks carry no weight, except a tilde after `n`, which turns it
/// into `ñ` the same as the precomposed letter.
fn sort_key(s: &str) -> Vec<u32> {
    let mut key = Vec::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        if c == COMBINING_TILDE && key.last() == Some(&primary_weight('n')) {
            key.pop();
            key.push(primary_weight('ñ'));
        } else if !COMBINING_MARKS.contains(&c) {
            key.push(primary_weight(c));
        }
    }
    key
}

/// Primary weight of one lowercased character
///
/// Weights are code points doubled, leaving odd slots free; `ñ` takes the slot
/// right after `n`.
fn primary_weight(c: char) -> u32 {
    if c == 'ñ' {
        return ('n' as u32) * 2 + 1;
    }
    (fold_accent(c) as u32) * 2
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
