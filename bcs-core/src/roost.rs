//! Roost buffer resolution: the snag age gate, the primary roost buffer,
//! and per-species maternity buffers.
//!
//! Snags (and, for maternity purposes, live roost trees) are ephemeral:
//! a buffer is only warranted while the last active visit is recent
//! enough. The gate compares against an explicit processing date supplied
//! by the caller so runs stay reproducible.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::abundance::{SiteAbundanceSummary, summarise_sites};
use crate::emit::{BufferClass, BufferRequest, BufferTier, Exemption};
use crate::policy::RoostPolicy;
use crate::record::{Condition, Era, Lifecycle, Site, Status, Structure, Visit};
use crate::species::Species;
use crate::species::SpeciesTag;

/// Result of the snag age gate for one visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnagGate {
    /// Whether the visit keeps the structure eligible for buffering.
    pub eligible: bool,
    /// Elapsed days between the processing date and the visit date, when
    /// the gate actually ran. Non-snag structures bypass the computation.
    pub elapsed_days: Option<i64>,
}

/// Gate a roost visit on elapsed time for ephemeral structures.
///
/// Only usable, active snag visits are measured; everything else passes
/// untouched. A visit is eligible while the elapsed time does not exceed
/// the policy's age limit.
///
/// # Examples
/// ```
/// use bcs_core::{roost, test_support, Structure};
/// use chrono::NaiveDate;
///
/// let mut visit = test_support::visit("v1", "2020/06/01");
/// visit.date = NaiveDate::from_ymd_opt(2020, 6, 1);
/// let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let gate = roost::snag_gate(&visit, Structure::Snag, as_of, 3650);
/// assert!(gate.eligible);
/// assert_eq!(gate.elapsed_days, Some(1461));
/// ```
pub fn snag_gate(visit: &Visit, structure: Structure, as_of: NaiveDate, limit_days: i64) -> SnagGate {
    if structure != Structure::Snag
        || visit.condition != Condition::Usable
        || visit.status != Status::Active
    {
        return SnagGate {
            eligible: true,
            elapsed_days: None,
        };
    }
    let Some(date) = visit.date else {
        // No resolvable date means no evidence the snag is still standing.
        return SnagGate {
            eligible: false,
            elapsed_days: None,
        };
    };
    let elapsed = as_of.signed_duration_since(date).num_days();
    SnagGate {
        eligible: elapsed <= limit_days,
        elapsed_days: Some(elapsed),
    }
}

fn tree_gate_passes(visit: &Visit, as_of: NaiveDate, limit_days: i64) -> bool {
    // Live roost trees age out the same way snags do for maternity
    // purposes; reuse the elapsed-time rule.
    let Some(date) = visit.date else { return false };
    as_of.signed_duration_since(date).num_days() <= limit_days
}

/// Resolve roost buffer requests for a set of sites.
///
/// Primary: one request per site whose most recent visit left it active,
/// post-WNS, with any snag still young enough. Maternity: one request per
/// `(site, species)` from the rolled-up roost summary when reproduction
/// was recorded, gated on tree age for live trees.
pub fn resolve_roosts(
    sites: &[Site],
    as_of: NaiveDate,
    policy: &RoostPolicy,
) -> Vec<BufferRequest> {
    let summaries = summarise_sites(sites, |site, visit| {
        visit.condition == Condition::Usable
            && visit.status == Status::Active
            && snag_gate(visit, site.structure, as_of, policy.snag_age_limit_days).eligible
    });
    let by_id: HashMap<&str, &SiteAbundanceSummary> = summaries
        .iter()
        .map(|summary| (summary.site_id.as_str(), summary))
        .collect();

    let mut requests = Vec::new();
    for site in sites {
        if primary_applies(site, as_of, policy) {
            requests.push(request(
                site,
                BufferTier::Primary,
                policy.primary_ft,
                SpeciesTag::General,
            ));
        }

        let Some(summary) = by_id.get(site.id.as_str()) else {
            continue;
        };
        if maternity_applies(site, summary, as_of, policy) {
            // Deduplicated by (site, species): each species emits at most
            // once per site, straight off the rolled-up summary.
            for species in Species::TRACKED {
                if summary.count(species).is_none() {
                    continue;
                }
                let Some(distance_ft) = policy.maternity_ft.for_species(species) else {
                    continue;
                };
                requests.push(request(
                    site,
                    BufferTier::Maternity,
                    distance_ft,
                    SpeciesTag::Single(species),
                ));
            }
        }
    }
    requests
}

fn primary_applies(site: &Site, as_of: NaiveDate, policy: &RoostPolicy) -> bool {
    if site.lifecycle != Some(Lifecycle::Active) {
        return false;
    }
    let Some(latest) = site.visits.iter().find(|v| v.recency_rank == Some(1)) else {
        return false;
    };
    latest.era == Some(Era::PostWns)
        && snag_gate(latest, site.structure, as_of, policy.snag_age_limit_days).eligible
}

fn maternity_applies(
    site: &Site,
    summary: &SiteAbundanceSummary,
    as_of: NaiveDate,
    policy: &RoostPolicy,
) -> bool {
    if !summary.reproducing || summary.era != Era::PostWns {
        return false;
    }
    if site.structure != Structure::Tree {
        return true;
    }
    site.visits
        .iter()
        .find(|v| v.recency_rank == Some(1))
        .is_some_and(|latest| tree_gate_passes(latest, as_of, policy.snag_age_limit_days))
}

fn request(site: &Site, tier: BufferTier, distance_ft: u32, species: SpeciesTag) -> BufferRequest {
    BufferRequest {
        site_id: site.id.clone(),
        site_name: site.name.clone(),
        unit_name: site.unit_name.clone(),
        unit_code: site.unit_code.clone(),
        class: BufferClass::Roost,
        tier,
        distance_ft,
        species,
        comments: String::new(),
        exempt: Exemption::from_raw(site.exempt_raw.as_deref()),
        location: site.location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReproStatus;
    use crate::test_support::{bcs_policy, observation, site, visit};
    use crate::SiteUse;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn roost_site(structure: Structure) -> Site {
        let mut s = site("r1", SiteUse::Roost);
        s.structure = structure;
        s.lifecycle = Some(Lifecycle::Active);
        let mut v = visit("v1", "2020/06/01");
        v.date = Some(ymd(2020, 6, 1));
        v.recency_rank = Some(1);
        v.era = Some(Era::PostWns);
        s.visits.push(v);
        s
    }

    #[rstest]
    #[case(3650, true)]
    #[case(3651, false)]
    fn snag_gate_boundary_at_ten_years(#[case] elapsed: i64, #[case] eligible: bool) {
        let mut v = visit("v1", "2010/01/01");
        v.date = Some(ymd(2010, 1, 1));
        let as_of = ymd(2010, 1, 1) + chrono::Duration::days(elapsed);
        let gate = snag_gate(&v, Structure::Snag, as_of, 3650);
        assert_eq!(gate.eligible, eligible);
        assert_eq!(gate.elapsed_days, Some(elapsed));
    }

    #[rstest]
    fn non_snag_structures_bypass_the_gate() {
        let mut v = visit("v1", "1990/01/01");
        v.date = Some(ymd(1990, 1, 1));
        let gate = snag_gate(&v, Structure::Other, ymd(2024, 1, 1), 3650);
        assert!(gate.eligible);
        assert_eq!(gate.elapsed_days, None);
    }

    #[rstest]
    fn primary_emitted_for_active_post_wns_roost() {
        let s = roost_site(Structure::Other);
        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2021, 1, 1), &bcs_policy().roost);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tier, BufferTier::Primary);
        assert_eq!(requests[0].distance_ft, 150);
        assert_eq!(requests[0].class, BufferClass::Roost);
    }

    #[rstest]
    fn aged_out_snag_earns_no_primary() {
        let s = roost_site(Structure::Snag);
        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2031, 1, 1), &bcs_policy().roost);
        assert!(requests.is_empty());
    }

    #[rstest]
    fn historic_roost_earns_no_primary() {
        let mut s = roost_site(Structure::Other);
        s.lifecycle = Some(Lifecycle::Historic);
        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2021, 1, 1), &bcs_policy().roost);
        assert!(requests.is_empty());
    }

    #[rstest]
    fn maternity_emitted_per_reproducing_species() {
        let mut s = roost_site(Structure::Other);
        let mut repro_obs = observation(Species::Indiana, Some(3));
        repro_obs.repro = ReproStatus::Reproducing;
        s.visits[0].observations = vec![repro_obs, observation(Species::TriColored, Some(1))];

        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2021, 1, 1), &bcs_policy().roost);
        let maternity: Vec<_> = requests
            .iter()
            .filter(|r| r.tier == BufferTier::Maternity)
            .map(|r| (r.species, r.distance_ft))
            .collect();
        assert_eq!(
            maternity,
            vec![
                (SpeciesTag::Single(Species::TriColored), 300),
                (SpeciesTag::Single(Species::Indiana), 3696),
            ]
        );
    }

    #[rstest]
    fn no_maternity_without_reproduction() {
        let mut s = roost_site(Structure::Other);
        s.visits[0].observations = vec![observation(Species::Indiana, Some(3))];
        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2021, 1, 1), &bcs_policy().roost);
        assert!(requests.iter().all(|r| r.tier != BufferTier::Maternity));
    }

    #[rstest]
    fn aged_out_tree_blocks_maternity_but_not_primary() {
        let mut s = roost_site(Structure::Tree);
        let mut repro_obs = observation(Species::LittleBrown, Some(2));
        repro_obs.repro = ReproStatus::Reproducing;
        s.visits[0].observations = vec![repro_obs];

        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2031, 1, 1), &bcs_policy().roost);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tier, BufferTier::Primary);
    }

    #[rstest]
    fn pre_wns_roost_emits_nothing() {
        let mut s = roost_site(Structure::Other);
        s.visits[0].era = Some(Era::PreWns);
        let mut repro_obs = observation(Species::LittleBrown, Some(2));
        repro_obs.repro = ReproStatus::Reproducing;
        s.visits[0].observations = vec![repro_obs];
        let requests = resolve_roosts(std::slice::from_ref(&s), ymd(2021, 1, 1), &bcs_policy().roost);
        assert!(requests.is_empty());
    }
}
