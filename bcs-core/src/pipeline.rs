//! Pipeline orchestration.
//!
//! One engine invocation runs the fixed forward sequence: sequencing,
//! lifecycle and era classification over every record, then the
//! hibernacula, roost, and capture resolvers in that order, with a single
//! deduplicating emitter at the end. Every aggregation structure is
//! created inside the run; nothing survives between invocations.

use chrono::NaiveDate;

use crate::abundance::summarise_sites;
use crate::capture::resolve_captures;
use crate::emit::{BufferRequest, BufferRequestEmitter};
use crate::era::{WnsReference, classify_captures, classify_visits};
use crate::lifecycle::classify_sites;
use crate::policy::{BufferPolicy, PolicyError};
use crate::record::{Condition, Site, SiteUse, Status};
use crate::report::RunReport;
use crate::roost::{resolve_roosts, snag_gate};
use crate::sequence::assign_recency_ranks;
use crate::store::SurveySet;
use crate::tiers::resolve_hibernacula;

/// Output of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Final deduplicated buffer requests, in emission order.
    pub requests: Vec<BufferRequest>,
    /// Diagnostics accumulated during the run.
    pub report: RunReport,
}

/// The classification and buffer-tier resolution engine.
///
/// Holds the externally-supplied reference data and an explicit
/// processing date, so identical inputs always produce identical output.
///
/// # Examples
/// ```
/// use bcs_core::{BufferEngine, SurveySet, test_support};
/// use chrono::NaiveDate;
///
/// let engine = BufferEngine::new(
///     test_support::wns_reference(),
///     test_support::bcs_policy(),
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
/// )?;
/// let outcome = engine.run(SurveySet::default());
/// assert!(outcome.requests.is_empty());
/// # Ok::<(), bcs_core::PolicyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BufferEngine {
    wns: WnsReference,
    policy: BufferPolicy,
    as_of: NaiveDate,
}

impl BufferEngine {
    /// Build an engine, validating the policy up front.
    ///
    /// An invalid policy aborts here, before any record is touched; this
    /// is the whole-pipeline failure reserved for missing or broken
    /// reference data.
    pub fn new(
        wns: WnsReference,
        policy: BufferPolicy,
        as_of: NaiveDate,
    ) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { wns, policy, as_of })
    }

    /// The processing date used by the snag age gate.
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Run the full pipeline over one survey set.
    ///
    /// Per-record failures (unparseable dates, unresolved administrative
    /// units) are tagged and reported, never fatal.
    pub fn run(&self, mut survey: SurveySet) -> RunOutcome {
        let mut report = RunReport::default();

        assign_recency_ranks(&mut survey.sites, &mut report);
        classify_sites(&mut survey.sites);
        classify_visits(&mut survey.sites, &self.wns, &mut report);
        classify_captures(&mut survey.captures, &self.wns, &mut report);

        let mut emitter = BufferRequestEmitter::new();

        let hibernacula: Vec<Site> = survey
            .sites
            .iter()
            .filter(|s| s.site_use == SiteUse::Hibernaculum)
            .cloned()
            .collect();
        let summaries = summarise_sites(&hibernacula, |_, visit| {
            visit.condition == Condition::Usable && visit.status == Status::Active
        });
        emitter.extend(resolve_hibernacula(
            &hibernacula,
            &summaries,
            &self.policy.hibernacula,
        ));
        log::info!(
            "hibernacula pass: {} sites, {} summaries",
            hibernacula.len(),
            summaries.len()
        );

        let roosts: Vec<Site> = survey
            .sites
            .iter()
            .filter(|s| s.site_use == SiteUse::Roost)
            .cloned()
            .collect();
        emitter.extend(resolve_roosts(&roosts, self.as_of, &self.policy.roost));
        log::info!("roost pass: {} sites", roosts.len());

        emitter.extend(resolve_captures(&survey.captures, &self.policy.capture));
        log::info!("capture pass: {} captures", survey.captures.len());

        report.duplicates_discarded = emitter.duplicates_discarded();
        let requests = emitter.finish();
        log::info!(
            "emitted {} buffer requests ({} duplicates discarded, {} records skipped)",
            requests.len(),
            report.duplicates_discarded,
            report.skipped.len()
        );
        RunOutcome { requests, report }
    }

    /// Expose the gate decision for a single roost visit.
    ///
    /// Lets callers surface the elapsed-days diagnostic the survey system
    /// records alongside its own data.
    pub fn gate_roost_visit(&self, site: &Site, visit_index: usize) -> Option<crate::roost::SnagGate> {
        let visit = site.visits.get(visit_index)?;
        Some(snag_gate(
            visit,
            site.structure,
            self.as_of,
            self.policy.roost.snag_age_limit_days,
        ))
    }
}
