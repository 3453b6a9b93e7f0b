//! Survey-export decoding.
//!
//! The engine consumes typed records; the export carries free text. This
//! module owns the raw JSON shapes and the string-to-enum normalisation,
//! so nothing downstream ever sees an unparsed attribute.

use geo::Coord;
use serde::Deserialize;

use bcs_core::{
    AgeClass, Capture, CaptureMethod, Condition, CountMethod, Observation, ReproStatus, Site,
    SiteUse, Species, Status, Structure, SurveySet, Visit,
};

/// A site row as exported from the survey system, visits nested.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSite {
    pub site_id: String,
    pub site_name: String,
    pub org_code: String,
    pub org_name: String,
    pub biological_site_use: String,
    #[serde(default)]
    pub site_type: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub public_exempt: Option<String>,
    #[serde(default)]
    pub visits: Vec<RawVisit>,
}

/// A visit row nested under a site.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVisit {
    pub visit_id: String,
    pub visit_date: String,
    #[serde(default)]
    pub site_condition: String,
    #[serde(default)]
    pub site_status: String,
    #[serde(default)]
    pub local_id: Option<String>,
    #[serde(default)]
    pub count_method: Option<String>,
    #[serde(default)]
    pub observations: Vec<RawObservation>,
}

/// A per-species observation row nested under a visit.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    pub scientific_name: String,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub reproductive_status: Option<String>,
}

/// A capture row as exported from the survey system.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCapture {
    pub observation_id: String,
    pub site_name: String,
    pub org_code: String,
    pub org_name: String,
    pub observation_date: String,
    pub scientific_name: String,
    #[serde(default)]
    pub reproductive_status: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub observation_method: Option<String>,
    #[serde(default)]
    pub site_type: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub public_exempt: Option<String>,
}

/// Assemble a typed survey set from raw export rows.
///
/// Observation and capture rows naming a species outside the tracked set
/// are dropped with a warning; the export query normally filters them at
/// source.
pub fn build_survey(sites: Vec<RawSite>, captures: Vec<RawCapture>) -> SurveySet {
    SurveySet {
        sites: sites.into_iter().map(map_site).collect(),
        captures: captures.into_iter().filter_map(map_capture).collect(),
    }
}

fn map_site(raw: RawSite) -> Site {
    Site {
        id: raw.site_id,
        name: raw.site_name,
        unit_code: raw.org_code,
        unit_name: raw.org_name,
        site_use: SiteUse::parse(&raw.biological_site_use),
        structure: Structure::parse(&raw.site_type),
        location: Coord {
            x: raw.longitude,
            y: raw.latitude,
        },
        exempt_raw: raw.public_exempt,
        visits: raw.visits.into_iter().map(map_visit).collect(),
        lifecycle: None,
    }
}

fn map_visit(raw: RawVisit) -> Visit {
    Visit {
        id: raw.visit_id,
        date_text: raw.visit_date,
        condition: Condition::parse(&raw.site_condition),
        status: Status::parse(&raw.site_status),
        local_id: raw.local_id,
        count_method: raw.count_method.as_deref().and_then(parse_count_method),
        observations: raw
            .observations
            .into_iter()
            .filter_map(map_observation)
            .collect(),
        date: None,
        recency_rank: None,
        era: None,
    }
}

fn map_observation(raw: RawObservation) -> Option<Observation> {
    let Some(species) = Species::from_scientific_name(&raw.scientific_name) else {
        log::warn!("dropping observation of untracked species {:?}", raw.scientific_name);
        return None;
    };
    Some(Observation {
        species,
        count: raw.count,
        repro: ReproStatus::parse(raw.reproductive_status.as_deref().unwrap_or_default()),
    })
}

fn map_capture(raw: RawCapture) -> Option<Capture> {
    let Some(species) = Species::from_scientific_name(&raw.scientific_name) else {
        log::warn!("dropping capture of untracked species {:?}", raw.scientific_name);
        return None;
    };
    let method = CaptureMethod::parse(raw.observation_method.as_deref().unwrap_or_default());
    // The export query only returns in-hand and visual observations.
    if method == CaptureMethod::Other {
        log::warn!("dropping capture {} with unsupported method", raw.observation_id);
        return None;
    }
    Some(Capture {
        id: raw.observation_id,
        site_name: raw.site_name,
        unit_code: raw.org_code,
        unit_name: raw.org_name,
        date_text: raw.observation_date,
        species,
        repro: ReproStatus::parse(raw.reproductive_status.as_deref().unwrap_or_default()),
        age: AgeClass::parse(raw.age.as_deref().unwrap_or_default()),
        method,
        site_type: raw.site_type,
        location: Coord {
            x: raw.longitude,
            y: raw.latitude,
        },
        exempt_raw: raw.public_exempt,
        date: None,
        era: None,
    })
}

fn parse_count_method(text: &str) -> Option<CountMethod> {
    match text.trim() {
        "Internal" => Some(CountMethod::Internal),
        "External" => Some(CountMethod::External),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_site_json() -> &'static str {
        r#"[{
            "site_id": "100",
            "site_name": "Moose Cave",
            "org_code": "0903",
            "org_name": "White Mountain",
            "biological_site_use": "Hibernating",
            "site_type": "Cave",
            "longitude": -71.5,
            "latitude": 44.1,
            "public_exempt": "Y",
            "visits": [{
                "visit_id": "v1",
                "visit_date": "2022/02/10",
                "site_condition": "Usable",
                "site_status": "Active",
                "local_id": "Internal survey",
                "observations": [
                    {"scientific_name": "Myotis sodalis", "count": 40},
                    {"scientific_name": "Ursus americanus", "count": 1}
                ]
            }]
        }]"#
    }

    #[rstest]
    fn decodes_and_normalises_site_rows() {
        let raw: Vec<RawSite> = serde_json::from_str(sample_site_json()).unwrap();
        let survey = build_survey(raw, Vec::new());

        let site = &survey.sites[0];
        assert_eq!(site.site_use, SiteUse::Hibernaculum);
        assert_eq!(site.exempt_raw.as_deref(), Some("Y"));

        let visit = &site.visits[0];
        assert_eq!(visit.condition, Condition::Usable);
        assert_eq!(visit.resolved_count_method(), CountMethod::Internal);
        // The bear row is untracked and dropped.
        assert_eq!(visit.observations.len(), 1);
        assert_eq!(visit.observations[0].species, Species::Indiana);
    }

    #[rstest]
    fn decodes_capture_rows() {
        let json = r#"[{
            "observation_id": "c1",
            "site_name": "Net Point 4",
            "org_code": "0920",
            "org_name": "Green Mountain",
            "observation_date": "2022/06/01 21:30",
            "scientific_name": "Perimyotis subflavus",
            "reproductive_status": "Reproducing",
            "age": "Adult",
            "observation_method": "In Hand",
            "site_type": "Sample Point",
            "longitude": -72.9,
            "latitude": 43.5
        }]"#;
        let raw: Vec<RawCapture> = serde_json::from_str(json).unwrap();
        let survey = build_survey(Vec::new(), raw);

        let capture = &survey.captures[0];
        assert_eq!(capture.species, Species::TriColored);
        assert_eq!(capture.repro, ReproStatus::Reproducing);
        assert_eq!(capture.method, CaptureMethod::InHand);
        assert!(capture.exempt_raw.is_none());
    }

    #[rstest]
    fn captures_without_a_supported_method_are_dropped() {
        let json = r#"[{
            "observation_id": "c1",
            "site_name": "Net Point 4",
            "org_code": "0920",
            "org_name": "Green Mountain",
            "observation_date": "2022/06/01",
            "scientific_name": "Myotis lucifugus",
            "observation_method": "Acoustic",
            "longitude": -72.9,
            "latitude": 43.5
        }]"#;
        let raw: Vec<RawCapture> = serde_json::from_str(json).unwrap();
        assert!(build_survey(Vec::new(), raw).captures.is_empty());
    }

    #[rstest]
    #[case("Internal", Some(CountMethod::Internal))]
    #[case("External", Some(CountMethod::External))]
    #[case("guess", None)]
    fn count_method_attribute_is_strict(
        #[case] text: &str,
        #[case] expected: Option<CountMethod>,
    ) {
        assert_eq!(parse_count_method(text), expected);
    }
}
