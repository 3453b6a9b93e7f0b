//! Visit sequencing: per-site recency ranks.
//!
//! Orders each site's visits by calendar date, most recent first, and
//! writes `recency_rank` back onto every dated visit. Visits whose date
//! text cannot be normalised receive no rank and are reported as skipped.

use crate::date::parse_survey_date;
use crate::record::Site;
use crate::report::{RunReport, SkippedRecord};

/// Parse visit dates and assign recency ranks for every site.
///
/// Ranks run 1..N per site over visits with a resolvable date, ordered by
/// date descending. Visits sharing a date are ordered by ascending visit
/// id, so ranking is a deterministic total order and exactly one visit per
/// site holds rank 1.
///
/// # Examples
/// ```
/// use bcs_core::{sequence, test_support, RunReport};
///
/// let mut site = test_support::site("s1", bcs_core::SiteUse::Hibernaculum);
/// site.visits.push(test_support::visit("v1", "2019/01/10"));
/// site.visits.push(test_support::visit("v2", "2021/06/02"));
///
/// let mut report = RunReport::default();
/// sequence::assign_recency_ranks(std::slice::from_mut(&mut site), &mut report);
/// assert_eq!(site.visits[1].recency_rank, Some(1));
/// assert_eq!(site.visits[0].recency_rank, Some(2));
/// ```
pub fn assign_recency_ranks(sites: &mut [Site], report: &mut RunReport) {
    for site in sites {
        for visit in &mut site.visits {
            match parse_survey_date(&visit.date_text) {
                Ok(date) => visit.date = Some(date),
                Err(err) => report.skip(SkippedRecord {
                    site_id: Some(site.id.clone()),
                    record_id: visit.id.clone(),
                    reason: err.into(),
                }),
            }
        }

        let mut order: Vec<usize> = (0..site.visits.len())
            .filter(|&i| site.visits[i].date.is_some())
            .collect();
        order.sort_by(|&a, &b| {
            let (va, vb) = (&site.visits[a], &site.visits[b]);
            vb.date.cmp(&va.date).then_with(|| va.id.cmp(&vb.id))
        });
        for (rank, index) in order.into_iter().enumerate() {
            site.visits[index].recency_rank = Some(rank as u32 + 1);
        }
    }
}
