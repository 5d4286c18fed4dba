use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// 128-bit identifier used for projects, folders and the solution itself.
///
/// Always rendered the way Visual Studio writes it: upper-case,
/// hyphenated and wrapped into braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Uuid);

impl Id {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Parses identifier in any of `{XXXXXXXX-...}`, `XXXXXXXX-...` forms
    /// ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(trimmed);
        Uuid::parse_str(inner).map(Self)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Uuid::encode_buffer();
        let upper = self.0.hyphenated().encode_upper(&mut buffer);
        write!(f, "{{{upper}}}")
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source of fresh identifiers.
pub trait IdSource {
    fn next_id(&mut self) -> Id;
}

/// Random (version 4) identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Id {
        Id(Uuid::new_v4())
    }
}

/// Predictable identifiers: 1, 2, 3 and so on.
/// Makes generated output reproducible.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Id {
        let id = Id::from_u128(self.next);
        self.next += 1;
        id
    }
}
