//! Fandom lookup data and the per-name half of tag wrangling.
//!
//! Follows the AO3 wrangling guidelines for character tags
//! (<https://archiveofourown.org/wrangling_guidelines/7>): a canonical character tag is
//! "given name family name", and a one-word name carries a fandom suffix so it can't be
//! confused with a same-named character elsewhere.

use crate::error::Result;
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};
use tracing::debug;

/// The built-in fandom, used when no config file is given
const ARCANE_TOML: &str = include_str!("../fandom/arcane.toml");

// On-disk shape of a fandom config
#[derive(Debug, Deserialize)]
struct FandomFile {
    name: String,
    primary_suffix: String,
    secondary_suffix: Option<String>,
    #[serde(default)]
    primary_cast: Vec<String>,
    #[serde(default)]
    atomic_names: Vec<String>,
}

/// Immutable lookup data for one fandom: who is in the primary cast, which names must never be
/// split, and the suffixes that disambiguate one-word names.
#[derive(Clone, Debug)]
pub struct Fandom {
    name: String,
    primary_suffix: String,
    secondary_suffix: String,
    primary_cast: HashSet<String>,
    atomic_names: HashSet<String>,
}

/// A character name with everything tag wrangling needs to know about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateName<'a> {
    pub name: &'a str,
    /// Has a given and a family name
    pub is_multi_word: bool,
    /// In the atomic set, so taken literally rather than word-reversed
    pub is_special_case: bool,
    /// Fandom suffix for this name, or empty
    pub disambiguation: &'a str,
}

impl Fandom {
    pub fn from_toml_str(text: &str) -> Result<Fandom> {
        let file: FandomFile = toml::from_str(text)?;

        Ok(Fandom {
            name: file.name,
            primary_suffix: file.primary_suffix,
            secondary_suffix: file.secondary_suffix.unwrap_or_default(),
            primary_cast: file.primary_cast.into_iter().collect(),
            atomic_names: file.atomic_names.into_iter().collect(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Fandom> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading fandom config");
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_primary_cast(&self, name: &str) -> bool {
        self.primary_cast.contains(name)
    }

    pub fn is_atomic(&self, name: &str) -> bool {
        self.atomic_names.contains(name)
    }

    /// Family-name-first form of `name`, used as the alphabetical sort key.
    /// Atomic names come back untouched.
    pub fn reversed_for_sort(&self, name: &str) -> String {
        if self.is_atomic(name) {
            return name.to_owned();
        }

        let mut words: Vec<&str> = name.split_whitespace().collect();
        words.reverse();
        words.join(" ")
    }

    pub fn is_multi_word(&self, name: &str) -> bool {
        !self.is_atomic(name) && name.split_whitespace().nth(1).is_some()
    }

    /// Which fandom suffix `name` would carry if it needed one. Whether it actually does is up to
    /// the pairing, see [`crate::build_tag`].
    pub fn disambiguation(&self, name: &str) -> &str {
        if self.is_primary_cast(name) {
            &self.primary_suffix
        } else {
            &self.secondary_suffix
        }
    }

    pub fn candidate<'a>(&'a self, name: &'a str) -> CandidateName<'a> {
        CandidateName {
            name,
            is_multi_word: self.is_multi_word(name),
            is_special_case: self.is_atomic(name),
            disambiguation: self.disambiguation(name),
        }
    }
}

impl Default for Fandom {
    fn default() -> Self {
        Self::from_toml_str(ARCANE_TOML).expect("bundled fandom config should parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_FANDOM: &str = r#"
        name = "Test"
        primary_suffix = " (Game)"
        secondary_suffix = " (Show)"
        primary_cast = ["Vi", "Jayce"]
        atomic_names = ["Old Man Hendrix"]
    "#;

    fn fandom() -> Fandom {
        Fandom::from_toml_str(TEST_FANDOM).expect("test config should parse")
    }

    #[test]
    fn reverses_given_and_family_name() {
        let fandom = fandom();
        assert_eq!(fandom.reversed_for_sort("Mel Medarda"), "Medarda Mel");
        assert_eq!(fandom.reversed_for_sort("Vi"), "Vi");
    }

    #[test]
    fn reversal_is_its_own_inverse() {
        let fandom = fandom();
        for name in ["Mel Medarda", "Cassandra Kiramman", "Vi", "A B C", "Silco"] {
            let twice = fandom.reversed_for_sort(&fandom.reversed_for_sort(name));
            assert_eq!(twice, name);
        }
    }

    #[test]
    fn atomic_names_are_left_alone() {
        let fandom = fandom();
        assert_eq!(fandom.reversed_for_sort("Old Man Hendrix"), "Old Man Hendrix");
        assert!(!fandom.is_multi_word("Old Man Hendrix"));
        assert!(fandom.candidate("Old Man Hendrix").is_special_case);
    }

    #[test]
    fn multi_word_needs_a_space() {
        let fandom = fandom();
        assert!(fandom.is_multi_word("Mel Medarda"));
        assert!(!fandom.is_multi_word("Sevika"));
        assert!(!fandom.is_multi_word(""));
    }

    #[test]
    fn suffix_depends_on_cast_bucket() {
        let fandom = fandom();
        assert_eq!(fandom.disambiguation("Vi"), " (Game)");
        assert_eq!(fandom.disambiguation("Sevika"), " (Show)");
        assert_eq!(fandom.disambiguation("Mel Medarda"), " (Show)");
    }

    #[test]
    fn missing_secondary_suffix_means_empty() {
        let fandom = Fandom::from_toml_str(
            r#"
            name = "Solo"
            primary_suffix = " (Solo)"
            primary_cast = ["Vi"]
            "#,
        )
        .expect("config should parse");

        assert_eq!(fandom.disambiguation("Vi"), " (Solo)");
        assert_eq!(fandom.disambiguation("Sevika"), "");
    }

    #[test]
    fn bundled_config_is_arcane() {
        let fandom = Fandom::default();
        assert_eq!(fandom.name(), "Arcane: League of Legends");
        assert!(fandom.is_primary_cast("Jinx"));
        assert!(!fandom.is_primary_cast("Silco"));
        assert_eq!(fandom.disambiguation("Silco"), " (Arcane: League of Legends)");
    }

    #[test]
    fn bad_config_is_an_error() {
        assert!(Fandom::from_toml_str("primary_cast = 3").is_err());
    }
}
