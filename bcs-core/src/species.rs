//! Bat species tracked by the conservation strategy.
//!
//! The enum offers compile-time safety for the threshold and distance
//! lookups that the original survey data drove with free-text scientific
//! names.
//!
//! # Examples
//! ```
//! use bcs_core::Species;
//!
//! assert_eq!(Species::Indiana.code(), "MYSO");
//! assert_eq!(
//!     Species::from_scientific_name("Pipistrellus subflavus"),
//!     Some(Species::TriColored),
//! );
//! ```

/// A bat species recorded in survey observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Tri-colored bat (*Perimyotis subflavus*).
    TriColored,
    /// Northern long-eared bat (*Myotis septentrionalis*).
    NorthernLongEared,
    /// Indiana bat (*Myotis sodalis*).
    Indiana,
    /// Little brown bat (*Myotis lucifugus*).
    LittleBrown,
    /// Bats recorded only at the order level (*Chiroptera*).
    UnspecifiedBat,
}

impl Species {
    /// The four named species tracked for buffer generation.
    ///
    /// [`Species::UnspecifiedBat`] is aggregated during abundance rollup
    /// but never receives a buffer of its own.
    pub const TRACKED: [Self; 4] = [
        Self::TriColored,
        Self::NorthernLongEared,
        Self::Indiana,
        Self::LittleBrown,
    ];

    /// Return the four-letter survey code for the species.
    ///
    /// # Examples
    /// ```
    /// use bcs_core::Species;
    ///
    /// assert_eq!(Species::LittleBrown.code(), "MYLU");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::TriColored => "PESU",
            Self::NorthernLongEared => "MYSE",
            Self::Indiana => "MYSO",
            Self::LittleBrown => "MYLU",
            Self::UnspecifiedBat => "BATS",
        }
    }

    /// Parse an NRM scientific name into a species.
    ///
    /// The tri-colored bat matches under both its current and former
    /// binomial. `Chiroptera` maps to the order-level aggregate. Returns
    /// `None` for anything else; callers drop such records at ingest.
    ///
    /// # Examples
    /// ```
    /// use bcs_core::Species;
    ///
    /// assert_eq!(
    ///     Species::from_scientific_name("Myotis sodalis"),
    ///     Some(Species::Indiana),
    /// );
    /// assert!(Species::from_scientific_name("Ursus americanus").is_none());
    /// ```
    pub fn from_scientific_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Perimyotis subflavus" | "Pipistrellus subflavus" => Some(Self::TriColored),
            "Myotis septentrionalis" => Some(Self::NorthernLongEared),
            "Myotis sodalis" => Some(Self::Indiana),
            "Myotis lucifugus" => Some(Self::LittleBrown),
            "Chiroptera" => Some(Self::UnspecifiedBat),
            _ => None,
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Species label carried on an emitted buffer request.
///
/// Hibernacula tiers for the Indiana and little brown bats resolve from a
/// combined count and are tagged with both codes; historical and roost
/// primary buffers apply to the site as a whole rather than one species.
///
/// # Examples
/// ```
/// use bcs_core::{Species, SpeciesTag};
///
/// assert_eq!(SpeciesTag::Single(Species::TriColored).to_string(), "PESU");
/// assert_eq!(SpeciesTag::IndianaLittleBrown.to_string(), "MYSO/MYLU");
/// assert_eq!(SpeciesTag::General.to_string(), "BCS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeciesTag {
    /// A single tracked species.
    Single(Species),
    /// Combined Indiana + little brown count.
    IndianaLittleBrown,
    /// Site-level buffer with no species attribution.
    General,
}

impl std::fmt::Display for SpeciesTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(species) => f.write_str(species.code()),
            Self::IndianaLittleBrown => f.write_str("MYSO/MYLU"),
            Self::General => f.write_str("BCS"),
        }
    }
}

impl From<SpeciesTag> for String {
    fn from(tag: SpeciesTag) -> Self {
        tag.to_string()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SpeciesTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Perimyotis subflavus", Species::TriColored)]
    #[case("Pipistrellus subflavus", Species::TriColored)]
    #[case("Myotis septentrionalis", Species::NorthernLongEared)]
    #[case("Myotis sodalis", Species::Indiana)]
    #[case("Myotis lucifugus", Species::LittleBrown)]
    #[case("Chiroptera", Species::UnspecifiedBat)]
    fn parses_scientific_names(#[case] name: &str, #[case] expected: Species) {
        assert_eq!(Species::from_scientific_name(name), Some(expected));
    }

    #[rstest]
    fn rejects_untracked_names() {
        assert!(Species::from_scientific_name("Eptesicus fuscus").is_none());
        assert!(Species::from_scientific_name("").is_none());
    }

    #[rstest]
    fn display_matches_code() {
        assert_eq!(Species::NorthernLongEared.to_string(), "MYSE");
    }

    #[rstest]
    fn aggregate_is_not_tracked() {
        assert!(!Species::TRACKED.contains(&Species::UnspecifiedBat));
    }
}
