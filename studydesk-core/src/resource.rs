//! Units, resource kinds, and links
//!
//! One stored resource field is addressed by (subject code, unit, kind) and
//! holds a single link.

use std::fmt;

use crate::{Error, Result};

/// A numbered subsection of a subject, 1 through 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit(u8);

impl Unit {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Validate a number into the 1..=6 range
    pub fn new(n: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(Error::InvalidUnit)
        }
    }

    /// Parse a unit number from user input
    pub fn parse(input: &str) -> Result<Self> {
        let n: i64 = input.trim().parse().map_err(|_| Error::InvalidUnit)?;
        Self::new(n)
    }

    /// All units in display order
    pub fn all() -> impl Iterator<Item = Unit> {
        (Self::MIN..=Self::MAX).map(Unit)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three kinds of resource link a unit can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Notes,
    Slides,
    PastPapers,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Notes,
        ResourceKind::Slides,
        ResourceKind::PastPapers,
    ];

    /// Canonical lowercase token
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Notes => "notes",
            ResourceKind::Slides => "slides",
            ResourceKind::PastPapers => "past-papers",
        }
    }

    /// Human-readable label for listings
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Notes => "Notes",
            ResourceKind::Slides => "Slides",
            ResourceKind::PastPapers => "Past Papers",
        }
    }

    /// Parse a kind token
    ///
    /// `ppt` and `pyq` stay accepted as aliases so older exports and
    /// operator habits keep working.
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "notes" => Ok(ResourceKind::Notes),
            "slides" | "ppt" => Ok(ResourceKind::Slides),
            "past-papers" | "pastpapers" | "pyq" => Ok(ResourceKind::PastPapers),
            other => Err(Error::UnknownResourceKind(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored resource link: any trimmed token starting with `http`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link(String);

impl Link {
    pub fn parse(input: &str) -> Result<Self> {
        let link = input.trim();
        if link.starts_with("http") {
            Ok(Self(link.to_string()))
        } else {
            Err(Error::InvalidLink)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
