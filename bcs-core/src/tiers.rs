//! Hibernacula buffer-tier resolution.
//!
//! Applies the policy's threshold tables to rolled-up site abundance.
//! Historic hibernacula short-circuit to a single historical-tier buffer;
//! everything else resolves per species group through the generic band
//! evaluator in [`crate::policy`].

use std::collections::HashMap;

use crate::abundance::SiteAbundanceSummary;
use crate::emit::{BufferClass, BufferRequest, BufferTier, Exemption};
use crate::policy::{HibernaculaPolicy, TierDistance};
use crate::record::{Lifecycle, Site};
use crate::species::Species;
use crate::species::SpeciesTag;

/// Resolve hibernacula buffer requests for a set of sites.
///
/// Sites whose most recent visit classified them historic receive one
/// historical-tier request and nothing else. The remaining sites resolve
/// their rolled-up counts against the tri-colored, northern long-eared
/// (internal or external, per the qualifying visit's count method), and
/// combined Indiana/little-brown tables. Candidates are returned in a
/// deterministic order; the emitter enforces uniqueness downstream.
pub fn resolve_hibernacula(
    sites: &[Site],
    summaries: &[SiteAbundanceSummary],
    policy: &HibernaculaPolicy,
) -> Vec<BufferRequest> {
    let by_id: HashMap<&str, &Site> = sites.iter().map(|s| (s.id.as_str(), s)).collect();
    let mut requests = Vec::new();

    for site in sites {
        if site.lifecycle == Some(Lifecycle::Historic) {
            requests.push(request(
                site,
                BufferTier::Historical,
                policy.historical_ft,
                SpeciesTag::General,
            ));
        }
    }

    for summary in summaries {
        let Some(site) = by_id.get(summary.site_id.as_str()) else {
            continue;
        };
        // Historic sites keep only the historical buffer.
        if site.lifecycle == Some(Lifecycle::Historic) {
            continue;
        }

        if let Some(count) = summary.count(Species::TriColored) {
            push_tiers(
                &mut requests,
                site,
                policy.tri_colored.resolve(count),
                SpeciesTag::Single(Species::TriColored),
            );
        }
        if let Some(count) = summary.count(Species::NorthernLongEared) {
            let table = policy.northern_long_eared(summary.count_method);
            push_tiers(
                &mut requests,
                site,
                table.resolve(count),
                SpeciesTag::Single(Species::NorthernLongEared),
            );
        }
        if let Some(count) = summary.combined {
            push_tiers(
                &mut requests,
                site,
                policy.indiana_little_brown.resolve(count),
                SpeciesTag::IndianaLittleBrown,
            );
        }
    }

    requests
}

fn push_tiers(
    requests: &mut Vec<BufferRequest>,
    site: &Site,
    tiers: Vec<TierDistance>,
    species: SpeciesTag,
) {
    for TierDistance { tier, distance_ft } in tiers {
        requests.push(request(site, tier, distance_ft, species));
    }
}

fn request(site: &Site, tier: BufferTier, distance_ft: u32, species: SpeciesTag) -> BufferRequest {
    BufferRequest {
        site_id: site.id.clone(),
        site_name: site.name.clone(),
        unit_name: site.unit_name.clone(),
        unit_code: site.unit_code.clone(),
        class: BufferClass::Hibernacula,
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
    use crate::record::{CountMethod, Era};
    use crate::test_support::{bcs_policy, site};
    use crate::SiteUse;
    use rstest::rstest;

    fn summary_with(species: Species, count: u64, method: CountMethod) -> SiteAbundanceSummary {
        let mut counts = HashMap::new();
        counts.insert(species, count);
        let combined = matches!(species, Species::Indiana | Species::LittleBrown)
            .then_some(count)
            .filter(|&c| c > 0);
        SiteAbundanceSummary {
            site_id: "s1".into(),
            era: Era::PostWns,
            counts,
            combined,
            count_method: method,
            reproducing: false,
        }
    }

    fn active_site() -> Site {
        let mut s = site("s1", SiteUse::Hibernaculum);
        s.lifecycle = Some(Lifecycle::Active);
        s
    }

    fn tiers_for(summary: SiteAbundanceSummary) -> Vec<(BufferTier, u32)> {
        let sites = vec![active_site()];
        let policy = bcs_policy().hibernacula;
        resolve_hibernacula(&sites, &[summary], &policy)
            .into_iter()
            .map(|r| (r.tier, r.distance_ft))
            .collect()
    }

    fn combined_summary(count: u64) -> SiteAbundanceSummary {
        summary_with(Species::Indiana, count, CountMethod::External)
    }

    #[rstest]
    #[case(19, vec![(BufferTier::Primary, 500)])]
    #[case(20, vec![(BufferTier::Primary, 500), (BufferTier::Secondary, 10560)])]
    #[case(4999, vec![(BufferTier::Primary, 500), (BufferTier::Secondary, 10560)])]
    #[case(
        5000,
        vec![
            (BufferTier::Primary, 500),
            (BufferTier::Secondary, 10560),
            (BufferTier::Tertiary, 26400),
        ]
    )]
    fn combined_count_boundaries(#[case] count: u64, #[case] expected: Vec<(BufferTier, u32)>) {
        assert_eq!(tiers_for(combined_summary(count)), expected);
    }

    #[rstest]
    fn internal_count_path_skips_primary() {
        let summary = summary_with(Species::NorthernLongEared, 15, CountMethod::Internal);
        assert_eq!(
            tiers_for(summary),
            vec![(BufferTier::Secondary, 1320), (BufferTier::Tertiary, 4488)]
        );
    }

    #[rstest]
    fn external_count_path_reaches_primary_and_secondary() {
        let summary = summary_with(Species::NorthernLongEared, 15, CountMethod::External);
        assert_eq!(
            tiers_for(summary),
            vec![(BufferTier::Primary, 500), (BufferTier::Secondary, 1320)]
        );
    }

    #[rstest]
    #[case(1, vec![(BufferTier::Primary, 500)])]
    #[case(10, vec![(BufferTier::Primary, 500), (BufferTier::Secondary, 1320)])]
    #[case(
        20,
        vec![
            (BufferTier::Primary, 500),
            (BufferTier::Secondary, 1320),
            (BufferTier::Tertiary, 4488),
        ]
    )]
    fn tri_colored_bands(#[case] count: u64, #[case] expected: Vec<(BufferTier, u32)>) {
        let summary = summary_with(Species::TriColored, count, CountMethod::External);
        assert_eq!(tiers_for(summary), expected);
    }

    #[rstest]
    fn recorded_zero_takes_the_unknown_abundance_fallback() {
        let summary = summary_with(Species::TriColored, 0, CountMethod::External);
        assert_eq!(
            tiers_for(summary),
            vec![
                (BufferTier::Primary, 500),
                (BufferTier::Secondary, 1320),
                (BufferTier::Tertiary, 4488),
            ]
        );
    }

    #[rstest]
    fn historic_site_gets_only_the_historical_buffer() {
        let mut s = site("s1", SiteUse::Hibernaculum);
        s.lifecycle = Some(Lifecycle::Historic);
        let summary = summary_with(Species::TriColored, 25, CountMethod::External);
        let policy = bcs_policy().hibernacula;
        let requests = resolve_hibernacula(std::slice::from_ref(&s), &[summary], &policy);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tier, BufferTier::Historical);
        assert_eq!(requests[0].distance_ft, 500);
        assert_eq!(requests[0].species, SpeciesTag::General);
    }

    #[rstest]
    fn unspecified_bats_earn_no_hibernacula_tier() {
        let summary = summary_with(Species::UnspecifiedBat, 400, CountMethod::External);
        assert!(tiers_for(summary).is_empty());
    }
}
