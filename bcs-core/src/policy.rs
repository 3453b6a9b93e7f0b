//! Declarative buffer policy: threshold tables and distances.
//!
//! The policy replaces the source's long chained species conditionals with
//! tables a single generic resolver evaluates. It is supplied at
//! configuration time so regional rule updates never require a code
//! change; a missing or invalid policy aborts the run at start-up.

use thiserror::Error;

use crate::emit::BufferTier;
use crate::record::CountMethod;
use crate::species::Species;

/// A tier with its buffer radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierDistance {
    /// Tier to emit.
    pub tier: BufferTier,
    /// Buffer radius in feet.
    pub distance_ft: u32,
}

/// One abundance band: a tier reached at an inclusive lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierBand {
    /// Tier to emit once the bound is met.
    pub tier: BufferTier,
    /// Inclusive minimum rolled-up count.
    pub min_count: u64,
    /// Buffer radius in feet.
    pub distance_ft: u32,
}

/// Threshold table for one species group at hibernacula.
///
/// Bands are cumulative: every band whose bound is met emits. A rolled-up
/// count recorded as exactly zero is the unknown-abundance sentinel and
/// takes the fallback set instead; the two paths are mutually exclusive.
///
/// # Examples
/// ```
/// use bcs_core::{BufferTier, TierBand, TierDistance, TierTable};
///
/// let table = TierTable {
///     unknown: vec![TierDistance { tier: BufferTier::Primary, distance_ft: 500 }],
///     bands: vec![TierBand { tier: BufferTier::Primary, min_count: 1, distance_ft: 500 }],
/// };
/// assert_eq!(table.resolve(0), table.unknown);
/// assert_eq!(table.resolve(1).len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierTable {
    /// Tiers emitted when abundance is recorded but unknown (count zero).
    pub unknown: Vec<TierDistance>,
    /// Cumulative abundance bands.
    pub bands: Vec<TierBand>,
}

impl TierTable {
    /// Resolve a rolled-up count into the tiers it earns.
    pub fn resolve(&self, count: u64) -> Vec<TierDistance> {
        if count == 0 {
            self.unknown.clone()
        } else {
            self.bands
                .iter()
                .filter(|band| count >= band.min_count)
                .map(|band| TierDistance {
                    tier: band.tier,
                    distance_ft: band.distance_ft,
                })
                .collect()
        }
    }
}

/// Hibernacula threshold tables.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HibernaculaPolicy {
    /// Radius retained around a historic hibernaculum, in feet.
    pub historical_ft: u32,
    /// Tri-colored bat table (count method not distinguished).
    pub tri_colored: TierTable,
    /// Northern long-eared bat, internal counts.
    pub northern_long_eared_internal: TierTable,
    /// Northern long-eared bat, external counts (the default path).
    pub northern_long_eared_external: TierTable,
    /// Combined Indiana + little brown table.
    pub indiana_little_brown: TierTable,
}

impl HibernaculaPolicy {
    /// Select the northern long-eared table for a count method.
    pub fn northern_long_eared(&self, method: CountMethod) -> &TierTable {
        match method {
            CountMethod::Internal => &self.northern_long_eared_internal,
            CountMethod::External => &self.northern_long_eared_external,
        }
    }
}

/// Per-species buffer radii in feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesDistances {
    /// Tri-colored bat.
    pub tri_colored: u32,
    /// Northern long-eared bat.
    pub northern_long_eared: u32,
    /// Indiana bat.
    pub indiana: u32,
    /// Little brown bat.
    pub little_brown: u32,
}

impl SpeciesDistances {
    /// Radius for a species, `None` for the order-level aggregate.
    pub fn for_species(&self, species: Species) -> Option<u32> {
        match species {
            Species::TriColored => Some(self.tri_colored),
            Species::NorthernLongEared => Some(self.northern_long_eared),
            Species::Indiana => Some(self.indiana),
            Species::LittleBrown => Some(self.little_brown),
            Species::UnspecifiedBat => None,
        }
    }
}

/// Roost buffer rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoostPolicy {
    /// Primary roost radius in feet.
    pub primary_ft: u32,
    /// Maternity radii per species.
    pub maternity_ft: SpeciesDistances,
    /// Maximum elapsed days since the last active visit for an ephemeral
    /// structure to still earn a buffer.
    pub snag_age_limit_days: i64,
}

/// Year-independent month/day window.
///
/// # Examples
/// ```
/// use bcs_core::SeasonWindow;
/// use chrono::NaiveDate;
///
/// let season = SeasonWindow { start_month: 4, start_day: 15, end_month: 8, end_day: 15 };
/// assert!(season.contains(NaiveDate::from_ymd_opt(1999, 6, 1).unwrap()));
/// assert!(!season.contains(NaiveDate::from_ymd_opt(1999, 3, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonWindow {
    /// First month of the window.
    pub start_month: u32,
    /// First day of the window, inclusive.
    pub start_day: u32,
    /// Last month of the window.
    pub end_month: u32,
    /// Last day of the window, inclusive.
    pub end_day: u32,
}

impl SeasonWindow {
    /// Whether the date's month/day falls inside the window, inclusive at
    /// both ends. The year is ignored.
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        use chrono::Datelike;
        let md = (date.month(), date.day());
        (self.start_month, self.start_day) <= md && md <= (self.end_month, self.end_day)
    }
}

/// Capture buffer rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapturePolicy {
    /// Maternity radii per species.
    pub maternity_ft: SpeciesDistances,
    /// Breeding-season window a capture date must fall within.
    pub season: SeasonWindow,
}

/// The complete externally-supplied buffer policy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferPolicy {
    /// Hibernacula threshold tables.
    pub hibernacula: HibernaculaPolicy,
    /// Roost rules.
    pub roost: RoostPolicy,
    /// Capture rules.
    pub capture: CapturePolicy,
}

/// Error from [`BufferPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A threshold table has no abundance bands.
    #[error("threshold table {table:?} has no abundance bands")]
    EmptyTable {
        /// Name of the offending table.
        table: &'static str,
    },
    /// A band's inclusive lower bound is zero, which would shadow the
    /// unknown-abundance sentinel.
    #[error("threshold table {table:?} has a band with min_count 0")]
    ZeroBound {
        /// Name of the offending table.
        table: &'static str,
    },
    /// The season window's month/day pair is not a real date.
    #[error("season window bound {month}/{day} is not a valid date")]
    InvalidSeason {
        /// Month of the bad bound.
        month: u32,
        /// Day of the bad bound.
        day: u32,
    },
    /// The snag age limit must be positive.
    #[error("snag age limit must be positive, got {days}")]
    NonPositiveSnagLimit {
        /// The rejected value.
        days: i64,
    },
}

impl BufferPolicy {
    /// Check structural invariants after loading.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let tables = [
            ("tri_colored", &self.hibernacula.tri_colored),
            (
                "northern_long_eared_internal",
                &self.hibernacula.northern_long_eared_internal,
            ),
            (
                "northern_long_eared_external",
                &self.hibernacula.northern_long_eared_external,
            ),
            ("indiana_little_brown", &self.hibernacula.indiana_little_brown),
        ];
        for (name, table) in tables {
            if table.bands.is_empty() {
                return Err(PolicyError::EmptyTable { table: name });
            }
            if table.bands.iter().any(|band| band.min_count == 0) {
                return Err(PolicyError::ZeroBound { table: name });
            }
        }
        if self.roost.snag_age_limit_days <= 0 {
            return Err(PolicyError::NonPositiveSnagLimit {
                days: self.roost.snag_age_limit_days,
            });
        }
        let season = &self.capture.season;
        for (month, day) in [
            (season.start_month, season.start_day),
            (season.end_month, season.end_day),
        ] {
            // 2000 is a leap year, so Feb 29 bounds stay valid.
            if chrono::NaiveDate::from_ymd_opt(2000, month, day).is_none() {
                return Err(PolicyError::InvalidSeason { month, day });
            }
        }
        Ok(())
    }
}
