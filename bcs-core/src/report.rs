//! Per-run diagnostics.
//!
//! Recoverable per-record failures never abort the run; they are tagged,
//! logged, and collected here so callers can audit what was excluded from
//! buffer emission.

use thiserror::Error;

use crate::date::DateError;

/// Why a record was excluded from buffer emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The record's date text matched no supported shape.
    #[error(transparent)]
    AmbiguousDate(#[from] DateError),
    /// The record's administrative unit is absent from the WNS reference.
    #[error("administrative unit {unit_code:?} not in WNS reference")]
    UnresolvedUnit {
        /// The unresolved unit code.
        unit_code: String,
    },
}

/// A record excluded from buffer emission, with its identity and reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Owning site id, when the record belongs to a site.
    pub site_id: Option<String>,
    /// Visit or capture id.
    pub record_id: String,
    /// Why the record was excluded.
    pub reason: SkipReason,
}

/// Summary of a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Records excluded from emission, in processing order.
    pub skipped: Vec<SkippedRecord>,
    /// Candidate requests discarded as `(site, tier, species)` duplicates.
    pub duplicates_discarded: usize,
}

impl RunReport {
    /// Record a skipped record and log it.
    pub(crate) fn skip(&mut self, record: SkippedRecord) {
        log::warn!(
            "skipping record {} (site {:?}): {}",
            record.record_id,
            record.site_id,
            record.reason
        );
        self.skipped.push(record);
    }
}
