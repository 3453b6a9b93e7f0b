//! Survey record types consumed and annotated by the pipeline.
//!
//! Sites own their visits and visits own their observations, replacing the
//! flat per-observation rows of the source feature layer. Fields derived by
//! the pipeline (`date`, `recency_rank`, `era`, `lifecycle`) are explicit
//! `Option`s that start out unset; no stage relies on values leaking from a
//! previous iteration.

use chrono::NaiveDate;
use geo::Coord;

use crate::Species;

/// How a site is used by bats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteUse {
    /// Overwintering site.
    Hibernaculum,
    /// Perch or roost site.
    Roost,
    /// Use not recorded or not recognised.
    Unknown,
}

impl SiteUse {
    /// Parse the survey's free-text biological-site-use value.
    ///
    /// Accepts both the NRM phrasing and the plain term; anything else is
    /// [`SiteUse::Unknown`].
    ///
    /// # Examples
    /// ```
    /// use bcs_core::SiteUse;
    ///
    /// assert_eq!(SiteUse::parse("Perch or Roost"), SiteUse::Roost);
    /// assert_eq!(SiteUse::parse("cave"), SiteUse::Unknown);
    /// ```
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "Hibernating" | "Hibernaculum" => Self::Hibernaculum,
            "Perch or Roost" | "Roost" => Self::Roost,
            _ => Self::Unknown,
        }
    }
}

/// Physical structure at a site.
///
/// Snags and live roost trees are ephemeral resources; their buffers are
/// gated on elapsed time since the last active visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// Standing dead tree.
    Snag,
    /// Live tree.
    Tree,
    /// Any other structure (cave, mine, building, ...).
    Other,
}

impl Structure {
    /// Parse the survey's site-type value.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "Snag" => Self::Snag,
            "Tree" => Self::Tree,
            _ => Self::Other,
        }
    }
}

/// Site condition recorded on a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The site can still be used by bats.
    Usable,
    /// The site can no longer be used (collapsed, felled, flooded, ...).
    Unusable,
    /// Condition not recorded.
    Unknown,
}

impl Condition {
    /// Parse the survey's visit-site-condition value.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "Usable" => Self::Usable,
            "Unusable" => Self::Unusable,
            _ => Self::Unknown,
        }
    }
}

/// Site status recorded on a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Bats currently use the site.
    Active,
    /// Bats no longer use the site.
    Inactive,
    /// Status not recorded.
    Unknown,
}

impl Status {
    /// Parse the survey's visit-site-status value.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "Active" => Self::Active,
            "Inactive" => Self::Inactive,
            _ => Self::Unknown,
        }
    }
}

/// Lifecycle label derived from a site's most recent visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Usable but no longer active.
    Historic,
    /// Usable and active.
    Active,
    /// No longer usable, regardless of status.
    NotUsable,
    /// The most recent visit matched no rule.
    Unknown,
    /// The site had no ranked visit to classify.
    Unclassified,
}

impl Lifecycle {
    /// Return the short survey label for the lifecycle.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Historic => "Hist",
            Self::Active => "Act",
            Self::NotUsable => "Not",
            Self::Unknown => "Unkn",
            Self::Unclassified => "err",
        }
    }
}

/// Disease-era label for a dated record, relative to the regional
/// white-nose syndrome detection year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    /// Dated before the unit's detection year.
    PreWns,
    /// Dated in or after the unit's detection year.
    PostWns,
    /// The unit has no detection on record.
    NoWns,
    /// The unit code could not be resolved against the reference table.
    Unresolved,
}

impl Era {
    /// Return the survey label for the era.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreWns => "PreWNS",
            Self::PostWns => "PostWNS",
            Self::NoWns => "NoWNS",
            Self::Unresolved => "error",
        }
    }
}

/// How a hibernaculum count was taken.
///
/// Internal counts of the northern long-eared bat resolve against a
/// different threshold table than external ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMethod {
    /// Surveyors counted inside the hibernaculum.
    Internal,
    /// Surveyors counted at the entrance.
    External,
}

/// Reproductive status recorded on an observation or capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReproStatus {
    /// Evidence of reproduction.
    Reproducing,
    /// No evidence of reproduction, or not recorded.
    NotReproducing,
}

impl ReproStatus {
    /// Parse the survey's reproductive-status value.
    pub fn parse(text: &str) -> Self {
        if text.trim() == "Reproducing" {
            Self::Reproducing
        } else {
            Self::NotReproducing
        }
    }
}

/// Age class recorded on a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeClass {
    /// Adult individual.
    Adult,
    /// Juvenile individual.
    Juvenile,
    /// Age not recorded.
    Unknown,
}

impl AgeClass {
    /// Parse the survey's age value.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "Adult" => Self::Adult,
            "Juvenile" => Self::Juvenile,
            _ => Self::Unknown,
        }
    }
}

/// How a capture observation was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMethod {
    /// The animal was handled.
    InHand,
    /// The animal was observed visually.
    Visual,
    /// Any other method.
    Other,
}

impl CaptureMethod {
    /// Parse the survey's observation-method value.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "In Hand" => Self::InHand,
            "Visual" => Self::Visual,
            _ => Self::Other,
        }
    }
}

/// A surveyed site with its visit history.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Survey control number.
    pub id: String,
    /// Human-readable site name.
    pub name: String,
    /// Administrative-unit code keying the WNS reference table.
    pub unit_code: String,
    /// Administrative-unit (forest) name.
    pub unit_name: String,
    /// How bats use the site.
    pub site_use: SiteUse,
    /// Physical structure at the site.
    pub structure: Structure,
    /// Site location, WGS84 with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
    /// Raw public-exemption attribute; only the literal `"Y"` exempts.
    pub exempt_raw: Option<String>,
    /// Visits recorded at the site.
    pub visits: Vec<Visit>,
    /// Lifecycle derived from the most recent visit. Set by the pipeline.
    pub lifecycle: Option<Lifecycle>,
}

/// A single survey visit to a site.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// Visit control number, unique within the site.
    pub id: String,
    /// Raw start-date text as exported from the survey system.
    pub date_text: String,
    /// Site condition observed on the visit.
    pub condition: Condition,
    /// Site status observed on the visit.
    pub status: Status,
    /// Free-text local identifier; may hint at the count method.
    pub local_id: Option<String>,
    /// Explicitly recorded count method, when the source provides one.
    pub count_method: Option<CountMethod>,
    /// Observations recorded on the visit.
    pub observations: Vec<Observation>,
    /// Calendar date parsed from `date_text`. Set by the pipeline.
    pub date: Option<NaiveDate>,
    /// Recency rank within the site, 1 = most recent. Set by the pipeline.
    pub recency_rank: Option<u32>,
    /// Disease era of the visit. Set by the pipeline.
    pub era: Option<Era>,
}

impl Visit {
    /// Resolve the count method for this visit.
    ///
    /// The explicit attribute wins. Failing that, a case-insensitive
    /// whole-word match for "internal" in the free-text local identifier is
    /// honoured as a compatibility shim for legacy records; everything else
    /// is an external count.
    ///
    /// # Examples
    /// ```
    /// use bcs_core::{CountMethod, test_support};
    ///
    /// let mut visit = test_support::visit("v1", "2021/02/01");
    /// visit.local_id = Some("Internal count, main passage".into());
    /// assert_eq!(visit.resolved_count_method(), CountMethod::Internal);
    /// ```
    pub fn resolved_count_method(&self) -> CountMethod {
        if let Some(method) = self.count_method {
            return method;
        }
        let internal = self.local_id.as_deref().is_some_and(|text| {
            text.split(|c: char| !c.is_alphanumeric())
                .any(|word| word.eq_ignore_ascii_case("internal"))
        });
        if internal {
            CountMethod::Internal
        } else {
            CountMethod::External
        }
    }
}

/// A per-species observation row within a visit.
///
/// A visit may carry several rows for one species; their counts accumulate
/// additively during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Observed species.
    pub species: Species,
    /// Recorded count. `Some(0)` is a genuine zero; `None` means the count
    /// was never taken.
    pub count: Option<u64>,
    /// Reproductive status recorded with the observation.
    pub repro: ReproStatus,
}

/// A capture event away from a fixed site.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Observation control number.
    pub id: String,
    /// Name of the sampling location.
    pub site_name: String,
    /// Administrative-unit code keying the WNS reference table.
    pub unit_code: String,
    /// Administrative-unit (forest) name.
    pub unit_name: String,
    /// Raw observation-date text.
    pub date_text: String,
    /// Captured species.
    pub species: Species,
    /// Reproductive status of the captured individual.
    pub repro: ReproStatus,
    /// Age class of the captured individual.
    pub age: AgeClass,
    /// How the observation was made.
    pub method: CaptureMethod,
    /// Site type of the capture location, e.g. `"Sample Point"`.
    pub site_type: String,
    /// Capture location, WGS84 with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
    /// Raw public-exemption attribute; only the literal `"Y"` exempts.
    pub exempt_raw: Option<String>,
    /// Calendar date parsed from `date_text`. Set by the pipeline.
    pub date: Option<NaiveDate>,
    /// Disease era of the capture. Set by the pipeline.
    pub era: Option<Era>,
}
