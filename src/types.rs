use crate::{fandom::Fandom, tag::compare_for_tag};
use std::{cmp::Ordering, fmt, str::FromStr};

// Genders order the way their codes sort, which keeps output grouped as f/f, f/m, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    F,
    M,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::F => "f",
            Gender::M => "m",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "f" => Ok(Gender::F),
            "m" => Ok(Gender::M),
            "other" => Ok(Gender::Other),
            other => Err(other.to_owned()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the roster
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Character {
    pub name: String,
    pub gender: Gender,
}

impl Character {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Character {
            name: name.into(),
            gender,
        }
    }
}

/// An unordered pair of names. Both orders of construction give the same key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(fandom: &Fandom, a: &str, b: &str) -> Self {
        let (first, second) = match compare_for_tag(fandom, a, b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };

        PairKey {
            first: first.to_owned(),
            second: second.to_owned(),
        }
    }

    pub fn is_self(&self) -> bool {
        self.first == self.second
    }
}

/// One row of the relationship table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipRecord {
    /// Earlier name by family name
    pub a: String,
    pub b: String,
    /// Gender pairing like "f/m", always in gender order. This need not match the order of
    /// `a` and `b`: Jayce/Vi is "f/m" although Jayce is the m.
    pub kind: String,
    pub selfcest: bool,
    /// Number of fics found, None until the pair has been searched
    pub count: Option<u64>,
}

impl RelationshipRecord {
    /// An unsearched record for `x` and `y`, given in gender order.
    pub fn new(fandom: &Fandom, x: &Character, y: &Character) -> Self {
        let key = PairKey::new(fandom, &x.name, &y.name);
        let selfcest = key.is_self();

        RelationshipRecord {
            a: key.first,
            b: key.second,
            kind: format!("{}/{}", x.gender, y.gender),
            selfcest,
            count: None,
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn pair(&self) -> String {
        format!("{}/{}", self.a, self.b)
    }
}

/// Every unordered pair from the roster, self-pairs included: N*(N+1)/2 records for N
/// characters. The roster is stably sorted by gender first so the output groups by type.
pub fn enumerate_pairs(fandom: &Fandom, roster: &[Character]) -> Vec<RelationshipRecord> {
    let mut sorted: Vec<&Character> = roster.iter().collect();
    sorted.sort_by_key(|c| c.gender);

    let n = sorted.len();
    let mut records = Vec::with_capacity(n * (n + 1) / 2);

    for (i, x) in sorted.iter().enumerate() {
        for y in &sorted[i..] {
            records.push(RelationshipRecord::new(fandom, x, y));
        }
    }

    records
}
