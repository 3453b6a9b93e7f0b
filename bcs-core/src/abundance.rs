//! Abundance aggregation: per-visit species counts rolled up per site.
//!
//! Counts accumulate additively across observation rows within one visit,
//! then roll up per site under the disease-era rule: units with no WNS
//! detection keep their historical peak across all qualifying visits,
//! units with a detection year only consider the last three visits. The
//! rolled-up value per species is a maximum, never a sum across visits.
//!
//! Accumulators are constructed inside each call and returned by value;
//! nothing is shared between the hibernacula and roost passes.

use std::collections::HashMap;

use crate::record::{CountMethod, Era, Site, Visit};
use crate::species::Species;

/// Number of most-recent visits considered for units with a WNS detection.
const RECENT_VISIT_WINDOW: u32 = 3;

/// Rolled-up abundance for one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteAbundanceSummary {
    /// The summarised site.
    pub site_id: String,
    /// Era selected for the rollup.
    pub era: Era,
    /// Rolled-up count per species. A zero value means abundance was
    /// recorded as unknown, not that the species was absent.
    pub counts: HashMap<Species, u64>,
    /// Combined Indiana + little brown count, when present and positive.
    pub combined: Option<u64>,
    /// Count method of the most recent qualifying visit.
    pub count_method: CountMethod,
    /// Whether any qualifying observation recorded reproduction.
    pub reproducing: bool,
}

impl SiteAbundanceSummary {
    /// Rolled-up count for a species, if the species was recorded.
    pub fn count(&self, species: Species) -> Option<u64> {
        self.counts.get(&species).copied()
    }
}

/// Roll up abundance for every site with at least one qualifying visit.
///
/// `eligible` filters visits on survey attributes (condition, status, and
/// for roosts the snag gate); the era window is applied on top of it:
/// no-detection units admit every eligible dated visit, detection units
/// admit only eligible visits ranked within the last three. Pre-WNS and
/// unresolved visits never qualify. Sites with no qualifying visit yield
/// no summary.
pub fn summarise_sites<F>(sites: &[Site], eligible: F) -> Vec<SiteAbundanceSummary>
where
    F: Fn(&Site, &Visit) -> bool,
{
    sites
        .iter()
        .filter_map(|site| summarise_site(site, &eligible))
        .collect()
}

fn qualifies(visit: &Visit) -> bool {
    match visit.era {
        Some(Era::NoWns) => true,
        Some(Era::PostWns) => visit
            .recency_rank
            .is_some_and(|rank| rank <= RECENT_VISIT_WINDOW),
        _ => false,
    }
}

fn summarise_site<F>(site: &Site, eligible: &F) -> Option<SiteAbundanceSummary>
where
    F: Fn(&Site, &Visit) -> bool,
{
    let included: Vec<&Visit> = site
        .visits
        .iter()
        .filter(|visit| eligible(site, visit) && qualifies(visit))
        .collect();
    let first = included.first()?;

    let mut counts: HashMap<Species, u64> = HashMap::new();
    let mut reproducing = false;
    for visit in &included {
        for (species, total) in visit_totals(visit) {
            counts
                .entry(species)
                .and_modify(|current| *current = (*current).max(total))
                .or_insert(total);
        }
        reproducing |= visit
            .observations
            .iter()
            .any(|obs| obs.repro == crate::record::ReproStatus::Reproducing);
    }

    let combined = combined_count(&counts);
    let count_method = included
        .iter()
        .min_by_key(|visit| visit.recency_rank.unwrap_or(u32::MAX))
        .unwrap_or(first)
        .resolved_count_method();
    // Era is uniform across qualifying visits: a unit is either on the
    // no-detection path or the detection-year path.
    let era = first.era.unwrap_or(Era::Unresolved);

    Some(SiteAbundanceSummary {
        site_id: site.id.clone(),
        era,
        counts,
        combined,
        count_method,
        reproducing,
    })
}

/// Additive per-species totals for one visit.
///
/// A species appears in the result as soon as any row carries a recorded
/// count, including an explicit zero; rows with no count never create an
/// entry.
fn visit_totals(visit: &Visit) -> HashMap<Species, u64> {
    let mut totals = HashMap::new();
    for obs in &visit.observations {
        let Some(count) = obs.count else { continue };
        *totals.entry(obs.species).or_insert(0) += count;
    }
    totals
}

fn combined_count(counts: &HashMap<Species, u64>) -> Option<u64> {
    let indiana = counts.get(&Species::Indiana);
    let little_brown = counts.get(&Species::LittleBrown);
    if indiana.is_none() && little_brown.is_none() {
        return None;
    }
    let sum = indiana.copied().unwrap_or(0) + little_brown.copied().unwrap_or(0);
    (sum > 0).then_some(sum)
}
