//! CLI round-trip tests over temporary JSON files.

use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use crate::{CliError, run_from};

const SITES_JSON: &str = r#"[{
    "site_id": "100",
    "site_name": "Moose Cave",
    "org_code": "0903",
    "org_name": "White Mountain",
    "biological_site_use": "Hibernating",
    "site_type": "Cave",
    "longitude": -71.5,
    "latitude": 44.1,
    "visits": [{
        "visit_id": "v1",
        "visit_date": "2022/02/10",
        "site_condition": "Usable",
        "site_status": "Active",
        "observations": [
            {"scientific_name": "Perimyotis subflavus", "count": 25}
        ]
    }]
}]"#;

const WNS_JSON: &str = r#"{"0903": "2015"}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let policy = serde_json::to_string(&bcs_core::test_support::bcs_policy())
            .expect("policy serialises");
        fs::write(dir.path().join("sites.json"), SITES_JSON).unwrap();
        fs::write(dir.path().join("wns.json"), WNS_JSON).unwrap();
        fs::write(dir.path().join("policy.json"), policy).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn args(&self) -> Vec<String> {
        vec![
            "bcsbuffer".into(),
            "--sites".into(),
            self.path("sites.json"),
            "--wns-table".into(),
            self.path("wns.json"),
            "--policy".into(),
            self.path("policy.json"),
            "--output".into(),
            self.path("out.json"),
            "--as-of".into(),
            "2024-06-01".into(),
        ]
    }
}

#[rstest]
fn writes_buffer_requests_for_a_survey_export() {
    let ws = Workspace::new();
    run_from(ws.args()).expect("run succeeds");

    let output = fs::read_to_string(ws.path("out.json")).unwrap();
    let requests: serde_json::Value = serde_json::from_str(&output).unwrap();
    let requests = requests.as_array().unwrap();

    // 25 tri-colored bats clear all three threshold bands.
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r["species"] == "PESU"));
    assert!(requests.iter().all(|r| r["site_id"] == "100"));
    assert_eq!(requests[0]["buffer_distance"], 500);
}

#[rstest]
fn missing_sites_file_aborts() {
    let ws = Workspace::new();
    let mut args = ws.args();
    args[2] = ws.path("absent.json");
    let err = run_from(args).unwrap_err();
    assert!(matches!(err, CliError::MissingSourceFile { field: "sites", .. }));
}

#[rstest]
fn malformed_wns_table_aborts() {
    let ws = Workspace::new();
    fs::write(Path::new(&ws.path("wns.json")), "not json").unwrap();
    let err = run_from(ws.args()).unwrap_err();
    assert!(matches!(err, CliError::ParseInput { .. }));
}

#[rstest]
fn invalid_policy_aborts_before_processing() {
    let ws = Workspace::new();
    let mut policy = bcs_core::test_support::bcs_policy();
    policy.hibernacula.tri_colored.bands.clear();
    fs::write(
        Path::new(&ws.path("policy.json")),
        serde_json::to_string(&policy).unwrap(),
    )
    .unwrap();
    let err = run_from(ws.args()).unwrap_err();
    assert!(matches!(err, CliError::InvalidPolicy(_)));
}

#[rstest]
fn bad_as_of_date_is_rejected() {
    let ws = Workspace::new();
    let mut args = ws.args();
    let last = args.len() - 1;
    args[last] = "06/01/2024".into();
    let err = run_from(args).unwrap_err();
    assert!(matches!(err, CliError::InvalidAsOfDate { .. }));
}
