//! Assembled per-subject listings
//!
//! A listing presents one subject as a fixed six-unit table, each unit
//! carrying up to three optional links. Units with nothing stored are still
//! present so callers can render a stable shape.

use std::collections::BTreeMap;

use crate::{Link, ResourceKind, Unit};

/// The three optional link slots of one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitLinks {
    pub notes: Option<Link>,
    pub slides: Option<Link>,
    pub past_papers: Option<Link>,
}

impl UnitLinks {
    pub fn get(&self, kind: ResourceKind) -> Option<&Link> {
        match kind {
            ResourceKind::Notes => self.notes.as_ref(),
            ResourceKind::Slides => self.slides.as_ref(),
            ResourceKind::PastPapers => self.past_papers.as_ref(),
        }
    }

    pub fn set(&mut self, kind: ResourceKind, link: Option<Link>) {
        match kind {
            ResourceKind::Notes => self.notes = link,
            ResourceKind::Slides => self.slides = link,
            ResourceKind::PastPapers => self.past_papers = link,
        }
    }

    /// True when no slot holds a link
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.slides.is_none() && self.past_papers.is_none()
    }
}

/// One subject's full listing
///
/// All six unit slots exist from construction; `unit` may index freely.
#[derive(Debug, Clone)]
pub struct SubjectListing {
    pub code: crate::SubjectCode,
    pub name: String,
    units: BTreeMap<Unit, UnitLinks>,
}

impl SubjectListing {
    /// Create an empty listing with all six units seeded
    pub fn new(code: crate::SubjectCode, name: String) -> Self {
        let units = Unit::all().map(|u| (u, UnitLinks::default())).collect();
        Self { code, name, units }
    }

    pub fn unit(&self, unit: Unit) -> &UnitLinks {
        &self.units[&unit]
    }

    pub fn unit_mut(&mut self, unit: Unit) -> &mut UnitLinks {
        self.units.entry(unit).or_default()
    }

    /// Units in ascending order with their links
    pub fn units(&self) -> impl Iterator<Item = (Unit, &UnitLinks)> {
        self.units.iter().map(|(u, l)| (*u, l))
    }

    /// True when every unit is empty
    pub fn is_empty(&self) -> bool {
        self.units.values().all(UnitLinks::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubjectCode;

    #[test]
    fn test_new_listing_seeds_all_units() {
        let listing = SubjectListing::new(
            SubjectCode::parse("CSE211").unwrap(),
            "Data Structures".into(),
        );
        assert_eq!(listing.units().count(), 6);
        assert!(listing.is_empty());
    }

    #[test]
    fn test_set_and_get_round_trip() {
        let mut listing = SubjectListing::new(
            SubjectCode::parse("CSE211").unwrap(),
            "Data Structures".into(),
        );
        let unit = Unit::new(2).unwrap();
        let link = Link::parse("https://example.com/u2.pdf").unwrap();
        listing
            .unit_mut(unit)
            .set(ResourceKind::PastPapers, Some(link.clone()));

        assert_eq!(listing.unit(unit).get(ResourceKind::PastPapers), Some(&link));
        assert_eq!(listing.unit(unit).get(ResourceKind::Notes), None);
        assert!(!listing.is_empty());
    }
}
