//! Survey date normalisation.
//!
//! The survey system exports visit dates either as a bare calendar date or
//! with a trailing time-of-day. Both collapse to a [`NaiveDate`]; ordering
//! never considers the time component.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Error from [`parse_survey_date`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The text matched neither supported date shape.
    #[error("unsupported date format {text:?}")]
    AmbiguousFormat {
        /// The offending raw text.
        text: String,
    },
}

/// Parse a survey date string into a calendar date.
///
/// Ten-character values parse as `YYYY/MM/DD`; sixteen-character values
/// parse as `YYYY/MM/DD HH:MM` and drop the time. Any other shape is an
/// [`DateError::AmbiguousFormat`], which callers treat as a recoverable
/// per-record error.
///
/// # Examples
/// ```
/// use bcs_core::date::parse_survey_date;
/// use chrono::NaiveDate;
///
/// let date = parse_survey_date("2019/03/07")?;
/// assert_eq!(date, NaiveDate::from_ymd_opt(2019, 3, 7).unwrap());
/// assert_eq!(parse_survey_date("2019/03/07 14:30")?, date);
/// assert!(parse_survey_date("03/07/2019").is_err());
/// # Ok::<(), bcs_core::date::DateError>(())
/// ```
pub fn parse_survey_date(text: &str) -> Result<NaiveDate, DateError> {
    let ambiguous = || DateError::AmbiguousFormat {
        text: text.to_owned(),
    };
    match text.len() {
        10 => NaiveDate::parse_from_str(text, "%Y/%m/%d").map_err(|_| ambiguous()),
        16 => NaiveDateTime::parse_from_str(text, "%Y/%m/%d %H:%M")
            .map(|dt| dt.date())
            .map_err(|_| ambiguous()),
        _ => Err(ambiguous()),
    }
}
