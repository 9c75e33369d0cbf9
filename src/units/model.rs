// src/units/model.rs
// =============================================================================
// The data model for a single poll of the listings page.
//
// - UnitRecord: one listed unit, kept exactly as the page displays it
// - Snapshot: the full set of units seen on one poll
//
// Nothing here is parsed into numbers. "$2,000" stays "$2,000" because we only
// ever compare and display these values, never do math on them.
//
// Rust concepts:
// - Derived Ord: field-by-field (lexicographic) ordering for free
// - BTreeSet: a sorted set, which gives us dedup + deterministic order
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;

// One unit as listed on the page
//
// The derive order matters: Ord compares bedroom, then price, then sqft,
// then availability, which is the order fields are declared in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitRecord {
    bedroom: String,
    price: String,
    sqft: String,
    availability: String,
}

impl UnitRecord {
    pub fn new(
        bedroom: impl Into<String>,
        price: impl Into<String>,
        sqft: impl Into<String>,
        availability: impl Into<String>,
    ) -> Self {
        Self {
            bedroom: bedroom.into(),
            price: price.into(),
            sqft: sqft.into(),
            availability: availability.into(),
        }
    }

    pub fn bedroom(&self) -> &str {
        &self.bedroom
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn sqft(&self) -> &str {
        &self.sqft
    }

    pub fn availability(&self) -> &str {
        &self.availability
    }
}

// Compact pipe-separated form used in notification bodies:
//   2BR|$2,000|900 sq.ft.|Available Now
impl fmt::Display for UnitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.bedroom, self.price, self.sqft, self.availability
        )
    }
}

// Every unit seen on one poll
//
// Backed by a BTreeSet so literal duplicates from the page collapse and
// iteration is always in UnitRecord order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    units: BTreeSet<UnitRecord>,
}

impl Snapshot {
    /// An empty snapshot (what the monitor starts with)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &UnitRecord> {
        self.units.iter()
    }

    pub(crate) fn as_set(&self) -> &BTreeSet<UnitRecord> {
        &self.units
    }
}

impl FromIterator<UnitRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = UnitRecord>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl Extend<UnitRecord> for Snapshot {
    fn extend<I: IntoIterator<Item = UnitRecord>>(&mut self, iter: I) {
        self.units.extend(iter);
    }
}
