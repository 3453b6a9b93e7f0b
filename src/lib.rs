//! Facade crate for the bat-conservation-strategy buffering engine.
//!
//! Re-exports the core pipeline, record, and policy types; the
//! `bcsbuffer` binary in `bcs-cli` drives them from JSON survey exports.

#![forbid(unsafe_code)]

pub use bcs_core::{
    BufferClass, BufferEngine, BufferPolicy, BufferRequest, BufferTier, Capture, Era, Exemption,
    Lifecycle, Observation, PolicyError, RunOutcome, RunReport, Site, SiteUse, Species, SpeciesTag,
    StoreError, SurveySet, SurveyStore, Visit, WnsOnset, WnsReference,
};
