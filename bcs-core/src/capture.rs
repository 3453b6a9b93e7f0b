//! Capture maternity buffer resolution.
//!
//! A capture earns a maternity buffer only inside the breeding-season
//! window, in a post-detection (or no-detection) era, with direct evidence
//! of reproduction or a juvenile in hand at a sample point. Each
//! `(site, species)` pair emits at most once.

use std::collections::HashSet;

use crate::emit::{BufferClass, BufferRequest, BufferTier, Exemption};
use crate::policy::CapturePolicy;
use crate::record::{AgeClass, Capture, CaptureMethod, Era, ReproStatus};
use crate::species::{Species, SpeciesTag};

/// Whether a capture satisfies every maternity condition.
///
/// The season window compares month and day only; the year is irrelevant.
/// Pre-WNS and unresolved-era captures never qualify.
pub fn is_maternity_capture(capture: &Capture, policy: &CapturePolicy) -> bool {
    let Some(date) = capture.date else {
        return false;
    };
    if !policy.season.contains(date) {
        return false;
    }
    if matches!(capture.era, None | Some(Era::PreWns) | Some(Era::Unresolved)) {
        return false;
    }
    if capture.repro != ReproStatus::Reproducing && capture.age != AgeClass::Juvenile {
        return false;
    }
    Species::TRACKED.contains(&capture.species)
        && capture.method == CaptureMethod::InHand
        && capture.site_type == "Sample Point"
}

/// Resolve maternity buffer requests from capture events.
///
/// Captures are processed in input order; the first qualifying capture for
/// a `(site, species)` pair wins and later ones are ignored.
pub fn resolve_captures(captures: &[Capture], policy: &CapturePolicy) -> Vec<BufferRequest> {
    let mut processed: HashSet<(String, Species)> = HashSet::new();
    let mut requests = Vec::new();

    for capture in captures {
        let key = (capture.site_name.clone(), capture.species);
        if processed.contains(&key) || !is_maternity_capture(capture, policy) {
            continue;
        }
        let Some(distance_ft) = policy.maternity_ft.for_species(capture.species) else {
            continue;
        };
        requests.push(BufferRequest {
            site_id: capture.id.clone(),
            site_name: capture.site_name.clone(),
            unit_name: capture.unit_name.clone(),
            unit_code: capture.unit_code.clone(),
            class: BufferClass::Capture,
            tier: BufferTier::Maternity,
            distance_ft,
            species: SpeciesTag::Single(capture.species),
            comments: String::new(),
            exempt: Exemption::from_raw(capture.exempt_raw.as_deref()),
            location: capture.location,
        });
        processed.insert(key);
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bcs_policy, capture};
    use chrono::NaiveDate;
    use rstest::rstest;

    fn june_capture(id: &str, species: Species) -> Capture {
        let mut c = capture(id, species, "2022/06/01");
        c.date = NaiveDate::from_ymd_opt(2022, 6, 1);
        c.era = Some(Era::PostWns);
        c.repro = ReproStatus::Reproducing;
        c
    }

    #[rstest]
    fn reproducing_indiana_capture_in_june_earns_9540_feet() {
        let c = june_capture("c1", Species::Indiana);
        let requests = resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tier, BufferTier::Maternity);
        assert_eq!(requests[0].distance_ft, 9540);
        assert_eq!(requests[0].class, BufferClass::Capture);
    }

    #[rstest]
    fn march_capture_is_outside_the_season_window() {
        let mut c = june_capture("c1", Species::Indiana);
        c.date = NaiveDate::from_ymd_opt(2022, 3, 1);
        assert!(resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture).is_empty());
    }

    #[rstest]
    #[case(Species::TriColored, 3960)]
    #[case(Species::NorthernLongEared, 3960)]
    #[case(Species::Indiana, 9540)]
    #[case(Species::LittleBrown, 9540)]
    fn distances_follow_the_species_table(#[case] species: Species, #[case] expected: u32) {
        let c = june_capture("c1", species);
        let requests = resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture);
        assert_eq!(requests[0].distance_ft, expected);
    }

    #[rstest]
    fn juvenile_qualifies_without_reproductive_status() {
        let mut c = june_capture("c1", Species::LittleBrown);
        c.repro = ReproStatus::NotReproducing;
        c.age = AgeClass::Juvenile;
        assert_eq!(
            resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture).len(),
            1
        );
    }

    #[rstest]
    fn adult_without_reproduction_does_not_qualify() {
        let mut c = june_capture("c1", Species::LittleBrown);
        c.repro = ReproStatus::NotReproducing;
        c.age = AgeClass::Adult;
        assert!(resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture).is_empty());
    }

    #[rstest]
    fn visual_method_and_other_site_types_are_excluded() {
        let mut visual = june_capture("c1", Species::Indiana);
        visual.method = CaptureMethod::Visual;
        let mut wrong_site = june_capture("c2", Species::Indiana);
        wrong_site.site_type = "Roost".into();
        let captures = [visual, wrong_site];
        assert!(resolve_captures(&captures, &bcs_policy().capture).is_empty());
    }

    #[rstest]
    #[case(Era::PreWns)]
    #[case(Era::Unresolved)]
    fn pre_wns_and_unresolved_eras_are_excluded(#[case] era: Era) {
        let mut c = june_capture("c1", Species::Indiana);
        c.era = Some(era);
        assert!(resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture).is_empty());
    }

    #[rstest]
    fn no_wns_era_still_qualifies() {
        let mut c = june_capture("c1", Species::Indiana);
        c.era = Some(Era::NoWns);
        assert_eq!(
            resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture).len(),
            1
        );
    }

    #[rstest]
    fn one_request_per_site_and_species() {
        let first = june_capture("c1", Species::Indiana);
        let mut second = june_capture("c2", Species::Indiana);
        second.site_name = first.site_name.clone();
        let mut other_species = june_capture("c3", Species::TriColored);
        other_species.site_name = first.site_name.clone();
        let captures = [first, second, other_species];
        let requests = resolve_captures(&captures, &bcs_policy().capture);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].site_id, "c1");
    }

    #[rstest]
    fn order_level_captures_are_ignored() {
        let c = june_capture("c1", Species::UnspecifiedBat);
        assert!(resolve_captures(std::slice::from_ref(&c), &bcs_policy().capture).is_empty());
    }
}
