//! Core engine for bat-conservation-strategy buffering.
//!
//! Converts multi-visit wildlife survey records (hibernacula, roosts,
//! capture events) into deduplicated, tiered buffer requests. The engine
//! is a deterministic batch pipeline: visits are sequenced by recency,
//! sites are classified by lifecycle and disease era, abundance rolls up
//! under an era-dependent window, and threshold tables resolve the final
//! protection tiers. Geometry generation and data acquisition live with
//! external collaborators; the engine only emits located, tiered buffer
//! requests.

#![forbid(unsafe_code)]

pub mod abundance;
pub mod capture;
pub mod date;
pub mod emit;
pub mod era;
pub mod lifecycle;
pub mod pipeline;
pub mod policy;
pub mod record;
pub mod report;
pub mod roost;
pub mod sequence;
pub mod species;
pub mod store;
pub mod test_support;
pub mod tiers;

pub use abundance::SiteAbundanceSummary;
pub use date::DateError;
pub use emit::{BufferClass, BufferRequest, BufferRequestEmitter, BufferTier, Exemption};
pub use era::{WnsOnset, WnsReference};
pub use pipeline::{BufferEngine, RunOutcome};
pub use policy::{
    BufferPolicy, CapturePolicy, HibernaculaPolicy, PolicyError, RoostPolicy, SeasonWindow,
    SpeciesDistances, TierBand, TierDistance, TierTable,
};
pub use record::{
    AgeClass, Capture, CaptureMethod, Condition, CountMethod, Era, Lifecycle, Observation,
    ReproStatus, Site, SiteUse, Status, Structure, Visit,
};
pub use report::{RunReport, SkipReason, SkippedRecord};
pub use species::{Species, SpeciesTag};
pub use store::{StoreError, SurveySet, SurveyStore};
