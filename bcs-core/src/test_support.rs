//! Test-only builders, reference fixtures, and an in-memory
//! [`SurveyStore`] used by unit and behaviour tests.

use geo::Coord;

use crate::abundance::SiteAbundanceSummary;
use crate::emit::{BufferClass, BufferRequest, BufferTier, Exemption};
use crate::era::{WnsOnset, WnsReference};
use crate::policy::{
    BufferPolicy, CapturePolicy, HibernaculaPolicy, RoostPolicy, SeasonWindow, SpeciesDistances,
    TierBand, TierDistance, TierTable,
};
use crate::record::{
    AgeClass, Capture, CaptureMethod, Condition, Observation, ReproStatus, Site, SiteUse, Status,
    Structure, Visit,
};
use crate::species::{Species, SpeciesTag};
use crate::store::{StoreError, SurveySet, SurveyStore};

/// Build a site with sensible defaults under unit `0903`.
pub fn site(id: &str, site_use: SiteUse) -> Site {
    Site {
        id: id.to_owned(),
        name: format!("Site {id}"),
        unit_code: "0903".to_owned(),
        unit_name: "White Mountain".to_owned(),
        site_use,
        structure: Structure::Other,
        location: Coord { x: -71.5, y: 44.1 },
        exempt_raw: None,
        visits: Vec::new(),
        lifecycle: None,
    }
}

/// Build a usable, active visit with no derived fields set.
pub fn visit(id: &str, date_text: &str) -> Visit {
    Visit {
        id: id.to_owned(),
        date_text: date_text.to_owned(),
        condition: Condition::Usable,
        status: Status::Active,
        local_id: None,
        count_method: None,
        observations: Vec::new(),
        date: None,
        recency_rank: None,
        era: None,
    }
}

/// Build a non-reproducing observation.
pub fn observation(species: Species, count: Option<u64>) -> Observation {
    Observation {
        species,
        count,
        repro: ReproStatus::NotReproducing,
    }
}

/// Build an in-hand sample-point capture with no derived fields set.
pub fn capture(id: &str, species: Species, date_text: &str) -> Capture {
    Capture {
        id: id.to_owned(),
        site_name: format!("Point {id}"),
        unit_code: "0903".to_owned(),
        unit_name: "White Mountain".to_owned(),
        date_text: date_text.to_owned(),
        species,
        repro: ReproStatus::NotReproducing,
        age: AgeClass::Adult,
        method: CaptureMethod::InHand,
        site_type: "Sample Point".to_owned(),
        location: Coord { x: -71.5, y: 44.1 },
        exempt_raw: None,
        date: None,
        era: None,
    }
}

/// Build a primary tri-colored hibernacula request for emitter tests.
pub fn request(site_id: &str) -> BufferRequest {
    BufferRequest {
        site_id: site_id.to_owned(),
        site_name: format!("Site {site_id}"),
        unit_name: "White Mountain".to_owned(),
        unit_code: "0903".to_owned(),
        class: BufferClass::Hibernacula,
        tier: BufferTier::Primary,
        distance_ft: 500,
        species: SpeciesTag::Single(Species::TriColored),
        comments: String::new(),
        exempt: Exemption::No,
        location: Coord { x: -71.5, y: 44.1 },
    }
}

/// Build a rolled-up summary for resolver tests.
pub fn summary(site_id: &str) -> SiteAbundanceSummary {
    SiteAbundanceSummary {
        site_id: site_id.to_owned(),
        era: crate::record::Era::PostWns,
        counts: std::collections::HashMap::new(),
        combined: None,
        count_method: crate::record::CountMethod::External,
        reproducing: false,
    }
}

/// A small WNS reference covering the unit codes used in tests:
/// `0903` detected in 2015, `0920` in 2011, `0805` with no detection, and
/// `08` a malformed legacy entry.
pub fn wns_reference() -> WnsReference {
    WnsReference::from_entries([
        ("0903".to_owned(), WnsOnset::Year(2015)),
        ("0920".to_owned(), WnsOnset::Year(2011)),
        ("0805".to_owned(), WnsOnset::NotDetected),
        ("08".to_owned(), WnsOnset::Invalid),
    ])
}

/// The published conservation-strategy policy, used as a test fixture.
///
/// Production runs load the same values from configuration; the engine
/// itself never hardcodes them.
pub fn bcs_policy() -> BufferPolicy {
    let unknown_small = vec![
        TierDistance {
            tier: BufferTier::Primary,
            distance_ft: 500,
        },
        TierDistance {
            tier: BufferTier::Secondary,
            distance_ft: 1320,
        },
        TierDistance {
            tier: BufferTier::Tertiary,
            distance_ft: 4488,
        },
    ];
    BufferPolicy {
        hibernacula: HibernaculaPolicy {
            historical_ft: 500,
            tri_colored: TierTable {
                unknown: unknown_small.clone(),
                bands: vec![
                    TierBand {
                        tier: BufferTier::Primary,
                        min_count: 1,
                        distance_ft: 500,
                    },
                    TierBand {
                        tier: BufferTier::Secondary,
                        min_count: 10,
                        distance_ft: 1320,
                    },
                    TierBand {
                        tier: BufferTier::Tertiary,
                        min_count: 20,
                        distance_ft: 4488,
                    },
                ],
            },
            northern_long_eared_internal: TierTable {
                unknown: unknown_small.clone(),
                bands: vec![
                    TierBand {
                        tier: BufferTier::Secondary,
                        min_count: 1,
                        distance_ft: 1320,
                    },
                    TierBand {
                        tier: BufferTier::Tertiary,
                        min_count: 5,
                        distance_ft: 4488,
                    },
                ],
            },
            northern_long_eared_external: TierTable {
                unknown: unknown_small,
                bands: vec![
                    TierBand {
                        tier: BufferTier::Primary,
                        min_count: 1,
                        distance_ft: 500,
                    },
                    TierBand {
                        tier: BufferTier::Secondary,
                        min_count: 10,
                        distance_ft: 1320,
                    },
                    TierBand {
                        tier: BufferTier::Tertiary,
                        min_count: 20,
                        distance_ft: 4488,
                    },
                ],
            },
            indiana_little_brown: TierTable {
                unknown: vec![
                    TierDistance {
                        tier: BufferTier::Primary,
                        distance_ft: 500,
                    },
                    TierDistance {
                        tier: BufferTier::Secondary,
                        distance_ft: 10560,
                    },
                    TierDistance {
                        tier: BufferTier::Tertiary,
                        distance_ft: 26400,
                    },
                ],
                bands: vec![
                    TierBand {
                        tier: BufferTier::Primary,
                        min_count: 1,
                        distance_ft: 500,
                    },
                    TierBand {
                        tier: BufferTier::Secondary,
                        min_count: 20,
                        distance_ft: 10560,
                    },
                    TierBand {
                        tier: BufferTier::Tertiary,
                        min_count: 5000,
                        distance_ft: 26400,
                    },
                ],
            },
        },
        roost: RoostPolicy {
            primary_ft: 150,
            maternity_ft: SpeciesDistances {
                tri_colored: 300,
                northern_long_eared: 1320,
                indiana: 3696,
                little_brown: 3696,
            },
            snag_age_limit_days: 3650,
        },
        capture: CapturePolicy {
            maternity_ft: SpeciesDistances {
                tri_colored: 3960,
                northern_long_eared: 3960,
                indiana: 9540,
                little_brown: 9540,
            },
            season: SeasonWindow {
                start_month: 4,
                start_day: 15,
                end_month: 8,
                end_day: 15,
            },
        },
    }
}

/// In-memory `SurveyStore` implementation used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Records returned by [`SurveyStore::load`].
    pub survey: SurveySet,
    /// Requests captured by [`SurveyStore::write_requests`].
    pub written: Vec<BufferRequest>,
}

impl MemoryStore {
    /// Create a store over a fixed survey set.
    pub fn with_survey(survey: SurveySet) -> Self {
        Self {
            survey,
            written: Vec::new(),
        }
    }
}

impl SurveyStore for MemoryStore {
    fn load(&self) -> Result<SurveySet, StoreError> {
        Ok(self.survey.clone())
    }

    fn write_requests(&mut self, requests: &[BufferRequest]) -> Result<(), StoreError> {
        self.written.extend_from_slice(requests);
        Ok(())
    }
}
