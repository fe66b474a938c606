//! Text scanning primitives behind [`NarrativeExtractor`](super::NarrativeExtractor).
//!
//! All matching is done on `char`s, so multi-byte labels such as
//! "VISÃO GERAL" and bullet markers such as `•` are handled without byte
//! offset arithmetic.

use crate::utils::char_len;

const BOLD: char = '*';
const BULLET_MARKERS: [char; 3] = ['-', '•', '*'];
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn matches_at(haystack: &[char], start: usize, needle: &[char]) -> bool {
    haystack.len() - start >= needle.len()
        && needle
            .iter()
            .zip(&haystack[start..])
            .all(|(&n, &h)| chars_eq_ignore_case(n, h))
}

/// Text following `**label**`, up to the next `*` or the end of the text.
///
/// The label is matched literally and case-insensitively. An optional colon
/// and surrounding whitespace are dropped. Occurrences followed directly by
/// another `*` are skipped; the first occurrence with any body wins, and a
/// body that is blank after trimming yields `None`.
pub fn extract_section(text: &str, label: &str) -> Option<String> {
    let haystack: Vec<char> = text.chars().collect();
    let needle: Vec<char> = format!("**{}**", label).chars().collect();

    if haystack.len() < needle.len() {
        return None;
    }

    for start in 0..=(haystack.len() - needle.len()) {
        if !matches_at(&haystack, start, &needle) {
            continue;
        }
        let body_start = start + needle.len();
        let body: String = haystack[body_start..]
            .iter()
            .take_while(|&&c| c != BOLD)
            .collect();
        if body.is_empty() {
            continue;
        }

        let body = body.strip_prefix(':').unwrap_or(&body).trim();
        return if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        };
    }

    None
}

/// Bullet lines with their marker removed.
///
/// A line is a bullet when its trimmed form starts with `-`, `•` or `*`.
/// Items shorter than `min_chars` characters are discarded and at most
/// `limit` items are returned, in text order.
pub fn extract_bullets(text: &str, min_chars: usize, limit: usize) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed.strip_prefix(BULLET_MARKERS)?;
            let item = rest.trim();
            (char_len(item) >= min_chars).then(|| item.to_string())
        })
        .take(limit)
        .collect()
}

/// Fragments between runs of `.`, `!` and `?`, trimmed.
///
/// Fragments shorter than `min_chars` characters are discarded and at most
/// `limit` are returned, in text order.
pub fn extract_key_sentences(text: &str, min_chars: usize, limit: usize) -> Vec<String> {
    text.split(SENTENCE_TERMINATORS)
        .map(str::trim)
        .filter(|fragment| char_len(fragment) >= min_chars)
        .take(limit)
        .map(str::to_string)
        .collect()
}
