//! Lifecycle classification from the most recent visit.
//!
//! Only the rank-1 visit speaks for a site. The four-branch precedence is
//! a pure function of the visit's (status, condition) pair, so re-running
//! classification is idempotent.

use crate::record::{Condition, Lifecycle, Site, Status};

/// Classify a (status, condition) pair.
///
/// Precedence: inactive-and-usable is historic, active-and-usable is
/// active, anything unusable is not usable, and everything else is
/// unknown.
///
/// # Examples
/// ```
/// use bcs_core::{lifecycle, Condition, Lifecycle, Status};
///
/// assert_eq!(
///     lifecycle::classify_pair(Status::Inactive, Condition::Usable),
///     Lifecycle::Historic,
/// );
/// assert_eq!(
///     lifecycle::classify_pair(Status::Unknown, Condition::Unusable),
///     Lifecycle::NotUsable,
/// );
/// ```
pub fn classify_pair(status: Status, condition: Condition) -> Lifecycle {
    match (status, condition) {
        (Status::Inactive, Condition::Usable) => Lifecycle::Historic,
        (Status::Active, Condition::Usable) => Lifecycle::Active,
        (_, Condition::Unusable) => Lifecycle::NotUsable,
        _ => Lifecycle::Unknown,
    }
}

/// Write a lifecycle label onto every site.
///
/// Sites without a rank-1 visit (no visit had a resolvable date) get the
/// explicit [`Lifecycle::Unclassified`] error label rather than being left
/// untagged; downstream consumers require a definite value.
pub fn classify_sites(sites: &mut [Site]) {
    for site in sites {
        let latest = site.visits.iter().find(|v| v.recency_rank == Some(1));
        site.lifecycle = Some(match latest {
            Some(visit) => classify_pair(visit.status, visit.condition),
            None => Lifecycle::Unclassified,
        });
    }
}
