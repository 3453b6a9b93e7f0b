//! JSON-file implementation of the survey store.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use bcs_core::{BufferRequest, StoreError, SurveySet, SurveyStore};

use crate::input::{RawCapture, RawSite, build_survey};

/// Survey store backed by JSON exports on disk.
///
/// Reads the site and capture exports, normalises them into typed
/// records, and writes the emitted buffer requests as a JSON array for
/// the downstream geometry service.
#[derive(Debug, Clone)]
pub struct JsonSurveyStore {
    sites: PathBuf,
    captures: Option<PathBuf>,
    output: PathBuf,
}

impl JsonSurveyStore {
    /// Create a store over the given export and output paths.
    pub fn new(sites: PathBuf, captures: Option<PathBuf>, output: PathBuf) -> Self {
        Self {
            sites,
            captures,
            output,
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, StoreError> {
        let file = File::open(path).map_err(|err| StoreError::Read {
            source: Box::new(err),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|err| StoreError::Read {
            source: Box::new(err),
        })
    }
}

impl SurveyStore for JsonSurveyStore {
    fn load(&self) -> Result<SurveySet, StoreError> {
        let sites: Vec<RawSite> = Self::read_json(&self.sites)?;
        let captures: Vec<RawCapture> = match &self.captures {
            Some(path) => Self::read_json(path)?,
            None => Vec::new(),
        };
        log::info!(
            "loaded {} sites and {} captures",
            sites.len(),
            captures.len()
        );
        Ok(build_survey(sites, captures))
    }

    fn write_requests(&mut self, requests: &[BufferRequest]) -> Result<(), StoreError> {
        let file = File::create(&self.output).map_err(|err| StoreError::Write {
            source: Box::new(err),
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), requests).map_err(|err| {
            StoreError::Write {
                source: Box::new(err),
            }
        })
    }
}
