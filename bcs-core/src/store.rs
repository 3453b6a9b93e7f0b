//! Data access seam for survey records and buffer-request output.
//!
//! The engine never touches files or feature services itself; callers
//! implement `SurveyStore` over whatever backs their data (a GIS export,
//! JSON files, an in-memory fixture) and hand the loaded records to the
//! pipeline.

use thiserror::Error;

use crate::emit::BufferRequest;
use crate::record::{Capture, Site};

/// A complete set of survey records for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveySet {
    /// Surveyed sites with their visit histories. Hibernacula and roosts
    /// share the collection; the pipeline partitions by site use.
    pub sites: Vec<Site>,
    /// Capture events away from fixed sites.
    pub captures: Vec<Capture>,
}

/// Error from a [`SurveyStore`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The survey records could not be read.
    #[error("failed to read survey records: {source}")]
    Read {
        /// Underlying backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The buffer requests could not be written.
    #[error("failed to write buffer requests: {source}")]
    Write {
        /// Underlying backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Access to persisted survey records and the buffer-request sink.
///
/// # Examples
///
/// ```rust
/// use bcs_core::{BufferRequest, StoreError, SurveySet, SurveyStore};
///
/// #[derive(Default)]
/// struct FixtureStore {
///     survey: SurveySet,
///     written: Vec<BufferRequest>,
/// }
///
/// impl SurveyStore for FixtureStore {
///     fn load(&self) -> Result<SurveySet, StoreError> {
///         Ok(self.survey.clone())
///     }
///
///     fn write_requests(&mut self, requests: &[BufferRequest]) -> Result<(), StoreError> {
///         self.written.extend_from_slice(requests);
///         Ok(())
///     }
/// }
///
/// let mut store = FixtureStore::default();
/// assert!(store.load().unwrap().sites.is_empty());
/// assert!(store.write_requests(&[]).is_ok());
/// ```
pub trait SurveyStore {
    /// Load every survey record for a run.
    fn load(&self) -> Result<SurveySet, StoreError>;

    /// Persist the final deduplicated buffer requests.
    fn write_requests(&mut self, requests: &[BufferRequest]) -> Result<(), StoreError>;
}
