//! Buffer-request records and the deduplicating emitter.
//!
//! Every resolver produces candidate [`BufferRequest`]s; the emitter is
//! the single point that enforces `(site, tier, species)` uniqueness and
//! exemption defaulting before anything reaches the output sink.

use std::collections::HashSet;

use geo::Coord;

use crate::SpeciesTag;

/// Which rule family produced a buffer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BufferClass {
    /// Hibernaculum abundance or historical rules.
    Hibernacula,
    /// Roost primary or maternity rules.
    Roost,
    /// Capture maternity rules.
    Capture,
}

/// Protection tier of a buffer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferTier {
    /// Innermost protective radius.
    Primary,
    /// Intermediate protective radius.
    Secondary,
    /// Outermost protective radius.
    Tertiary,
    /// Radius around evidence of reproduction.
    Maternity,
    /// Radius retained around a historic hibernaculum.
    Historical,
}

/// Public-exemption flag on an emitted request.
///
/// Only the explicit `"Y"` sentinel in the source exempts a record;
/// anything else, including an absent attribute, defaults to `No`.
///
/// # Examples
/// ```
/// use bcs_core::Exemption;
///
/// assert_eq!(Exemption::from_raw(Some("Y")), Exemption::Yes);
/// assert_eq!(Exemption::from_raw(Some("yes")), Exemption::No);
/// assert_eq!(Exemption::from_raw(None), Exemption::No);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    /// Exempt from public distribution.
    Yes,
    /// Not exempt.
    No,
}

impl Exemption {
    /// Normalise the raw source attribute.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("Y") => Self::Yes,
            _ => Self::No,
        }
    }

    /// Return the single-letter survey flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Y",
            Self::No => "N",
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Exemption {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One geometrically-located buffer request.
///
/// The engine's entire output contract: a downstream geometry service
/// turns each record into an actual buffer polygon keyed by
/// `buffer_distance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BufferRequest {
    /// Site or observation control number.
    pub site_id: String,
    /// Site name for the output table.
    pub site_name: String,
    /// Administrative-unit (forest) name.
    pub unit_name: String,
    /// Administrative-unit code.
    pub unit_code: String,
    /// Rule family that produced the request.
    #[cfg_attr(feature = "serde", serde(rename = "buffer_class"))]
    pub class: BufferClass,
    /// Protection tier.
    #[cfg_attr(feature = "serde", serde(rename = "buffer_tier"))]
    pub tier: BufferTier,
    /// Buffer radius in feet.
    #[cfg_attr(feature = "serde", serde(rename = "buffer_distance"))]
    pub distance_ft: u32,
    /// Species attribution.
    pub species: SpeciesTag,
    /// Free-text comments carried to the output table.
    pub comments: String,
    /// Public-exemption flag.
    pub exempt: Exemption,
    /// Buffer centre, WGS84 with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
}

/// Deduplicating collector for candidate buffer requests.
///
/// # Examples
/// ```
/// use bcs_core::{BufferRequestEmitter, test_support};
///
/// let mut emitter = BufferRequestEmitter::new();
/// let request = test_support::request("s1");
/// assert!(emitter.push(request.clone()));
/// assert!(!emitter.push(request));
/// assert_eq!(emitter.finish().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct BufferRequestEmitter {
    seen: HashSet<(String, BufferTier, SpeciesTag)>,
    requests: Vec<BufferRequest>,
    duplicates: usize,
}

impl BufferRequestEmitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a candidate request unless its `(site, tier, species)` triple
    /// was already emitted. Returns whether the request was kept.
    pub fn push(&mut self, request: BufferRequest) -> bool {
        let key = (request.site_id.clone(), request.tier, request.species);
        if self.seen.insert(key) {
            self.requests.push(request);
            true
        } else {
            log::debug!(
                "discarding duplicate buffer request: site {} {:?} {}",
                request.site_id,
                request.tier,
                request.species
            );
            self.duplicates += 1;
            false
        }
    }

    /// Accept a batch of candidates.
    pub fn extend<I: IntoIterator<Item = BufferRequest>>(&mut self, requests: I) {
        for request in requests {
            self.push(request);
        }
    }

    /// Number of duplicate candidates discarded so far.
    pub fn duplicates_discarded(&self) -> usize {
        self.duplicates
    }

    /// Consume the emitter and return the deduplicated requests in
    /// emission order.
    pub fn finish(self) -> Vec<BufferRequest> {
        self.requests
    }
}
