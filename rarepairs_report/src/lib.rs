//! Queries over a scraped relationship table: the most written pairings, the rarepairs and the
//! pairings nobody has written yet.

use rarepairs::{build_tag, search_url, Fandom, RelationshipRecord};
use std::collections::HashSet;

/// Which rows of the table to look at. The default keeps everything except selfcest.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Relationship types to keep, e.g. "f/f". None keeps every type.
    pub types: Option<Vec<String>>,
    /// Only pairings involving this character
    pub character: Option<String>,
    pub include_selfcest: bool,
}

impl Filter {
    pub fn new() -> Filter {
        Filter::default()
    }

    pub fn with_types(mut self, types: Vec<String>) -> Filter {
        self.types = Some(types);
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Filter {
        self.character = Some(character.into());
        self
    }

    pub fn with_selfcest(mut self, include_selfcest: bool) -> Filter {
        self.include_selfcest = include_selfcest;
        self
    }

    pub fn matches(&self, record: &RelationshipRecord) -> bool {
        if record.selfcest && !self.include_selfcest {
            return false;
        }

        if let Some(types) = &self.types {
            if !types.iter().any(|t| *t == record.kind) {
                return false;
            }
        }

        match &self.character {
            Some(name) => record.a == *name || record.b == *name,
            None => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [RelationshipRecord]) -> Vec<&'a RelationshipRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Relationship types present in the table, in first-seen order
pub fn relationship_types(records: &[RelationshipRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.kind.as_str()))
        .map(|r| r.kind.clone())
        .collect()
}

/// The `n` most written pairings, most first. Equal counts keep table order.
pub fn top_pairs<'a>(records: &[&'a RelationshipRecord], n: usize) -> Vec<&'a RelationshipRecord> {
    let mut counted: Vec<_> = records
        .iter()
        .copied()
        .filter(|r| r.count.is_some())
        .collect();
    counted.sort_by(|x, y| y.count.cmp(&x.count));
    counted.truncate(n);
    counted
}

/// The `n` least written pairings that have at least one fic, least first.
/// Every pairing tied with the last one is kept, so this can return more than `n`.
pub fn rarepairs<'a>(records: &[&'a RelationshipRecord], n: usize) -> Vec<&'a RelationshipRecord> {
    let mut written: Vec<_> = records
        .iter()
        .copied()
        .filter(|r| r.count.is_some_and(|c| c > 0))
        .collect();
    written.sort_by_key(|r| r.count);

    if n == 0 {
        return Vec::new();
    }

    if let Some(cutoff) = written.get(n - 1).map(|r| r.count) {
        written.retain(|r| r.count <= cutoff);
    }
    written
}

/// Pairings with no fics at all
pub fn zero_pairs<'a>(records: &[&'a RelationshipRecord]) -> Vec<&'a RelationshipRecord> {
    records
        .iter()
        .copied()
        .filter(|r| r.count == Some(0))
        .collect()
}

/// Link to the same search the count came from
pub fn deep_link(fandom: &Fandom, base_url: &str, record: &RelationshipRecord) -> String {
    search_url(base_url, &build_tag(fandom, &record.a, &record.b))
}
