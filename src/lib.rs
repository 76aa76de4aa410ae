//! Shared pieces of rarepairs: the fandom lookup data, AO3 tag wrangling, the relationship
//! table and the files it lives in.

pub mod error;
pub mod fandom;
pub mod table;
pub mod tag;
pub mod types;

use const_format::formatcp;
use std::path::{Path, PathBuf};

pub use error::{Error, Result};
pub use fandom::{CandidateName, Fandom};
pub use tag::{build_tag, search_url};
pub use types::{enumerate_pairs, Character, Gender, PairKey, RelationshipRecord};

/// Root of the archive. Everything we talk to lives under here.
pub const ARCHIVE_URL: &str = "https://archiveofourown.org";

/// Query parameter holding the search text on the works search page
pub const SEARCH_FIELD: &str = "work_search[query]";

// Directory where data files can be found
const DATA_DIR: &str = ".";

// Default file locations
const CHARACTERS_INPUT: &str = formatcp!("{}/characters.csv", DATA_DIR);
const RELATIONSHIPS_OUTPUT: &str = formatcp!("{}/relationships.csv", DATA_DIR);

/// Suffix added to the output file stem when a run is cut short
const PARTIAL_SUFFIX: &str = "_partial";

/// Where the roster is read from and where the relationship table goes.
#[derive(Clone, Debug)]
pub struct DataFiles {
    pub characters: PathBuf,
    pub relationships: PathBuf,
}

impl DataFiles {
    pub fn new() -> Self {
        DataFiles {
            characters: PathBuf::from(CHARACTERS_INPUT),
            relationships: PathBuf::from(RELATIONSHIPS_OUTPUT),
        }
    }

    pub fn with_characters(mut self, characters: impl Into<PathBuf>) -> Self {
        self.characters = characters.into();
        self
    }

    pub fn with_relationships(mut self, relationships: impl Into<PathBuf>) -> Self {
        self.relationships = relationships.into();
        self
    }

    /// Where an aborted run writes, so the canonical table is never clobbered by partial data.
    /// `out/relationships.csv` becomes `out/relationships_partial.csv`.
    pub fn partial_relationships(&self) -> PathBuf {
        partial_path(&self.relationships)
    }
}

impl Default for DataFiles {
    fn default() -> Self {
        Self::new()
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, PARTIAL_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, PARTIAL_SUFFIX),
    };

    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_name_keeps_directory_and_extension() {
        let files = DataFiles::new().with_relationships("out/relationships.csv");
        assert_eq!(
            files.partial_relationships(),
            PathBuf::from("out/relationships_partial.csv")
        );
    }

    #[test]
    fn partial_name_without_extension() {
        let files = DataFiles::new().with_relationships("relationships");
        assert_eq!(
            files.partial_relationships(),
            PathBuf::from("relationships_partial")
        );
    }

    #[test]
    fn defaults_point_at_working_directory() {
        let files = DataFiles::default();
        assert_eq!(files.characters, PathBuf::from("./characters.csv"));
        assert_eq!(files.relationships, PathBuf::from("./relationships.csv"));
    }
}
