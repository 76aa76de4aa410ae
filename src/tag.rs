//! Relationship tags, wrangled the AO3 way
//! (<https://archiveofourown.org/wrangling_guidelines/8>).
//!
//! Names go in alphabetical order by family name, separated by a slash. A pairing from a single
//! fandom takes one suffix at the end; a crossover keeps a suffix on each one-word name. A
//! multi-word name makes its fandom obvious and never needs one.

use crate::{
    fandom::{CandidateName, Fandom},
    SEARCH_FIELD,
};
use std::cmp::Ordering;

/// Builds the canonical relationship tag for a pairing. Argument order doesn't matter.
///
/// A wrong tag doesn't fail, it just finds zero (or someone else's) fics, so this is worth
/// keeping exactly in step with how the archive wrangles.
pub fn build_tag(fandom: &Fandom, name1: &str, name2: &str) -> String {
    let (name1, name2) = match compare_for_tag(fandom, name1, name2) {
        Ordering::Greater => (name2, name1),
        _ => (name1, name2),
    };

    let first = fandom.candidate(name1);
    let second = fandom.candidate(name2);

    let either_multi = first.is_multi_word || second.is_multi_word;
    let (suffix1, suffix2) = if first.disambiguation == second.disambiguation {
        // One fandom: a single trailing suffix, and none at all if a full name is present
        let suffix2 = if either_multi { "" } else { second.disambiguation };
        ("", suffix2)
    } else {
        (unless_multi_word(&first), unless_multi_word(&second))
    };

    format!("{}{}/{}{}", name1, suffix1, name2, suffix2)
}

fn unless_multi_word<'a>(candidate: &CandidateName<'a>) -> &'a str {
    if candidate.is_multi_word {
        ""
    } else {
        candidate.disambiguation
    }
}

/// Family-name order, ties broken on the names as written.
pub fn compare_for_tag(fandom: &Fandom, name1: &str, name2: &str) -> Ordering {
    fandom
        .reversed_for_sort(name1)
        .cmp(&fandom.reversed_for_sort(name2))
        .then_with(|| name1.cmp(name2))
}

/// Exact-phrase search URL for a tag. The whole quoted tag is percent-encoded.
pub fn search_url(base_url: &str, tag: &str) -> String {
    format!(
        "{}/works/search?{}={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(SEARCH_FIELD),
        urlencoding::encode(&format!("\"{}\"", tag))
    )
}
