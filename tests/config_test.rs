//! Integration tests for configuration loading

use std::io::Write;
use tempfile::NamedTempFile;
use visitor_watch::domain::EmployeeId;
use visitor_watch::infra::{Config, ScriptStep};
use visitor_watch::io::OutputFormat;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[site]
id = "lab-2"

[report]
format = "json"

[security]
enabled = false
name = "Night Desk"

[[employees]]
id = 7
name = "Noor Haddad"
title = "Lab Manager"

[[script]]
action = "entry"
visitor_id = 1
name = "Tess Wu"
purpose = "Audit"
poc_id = 7
at = "2026-10-14T08:30:00Z"

[[script]]
action = "exit"
visitor_id = 1
at = "2026-10-14T09:45:00+01:00"
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.site_id(), "lab-2");
    assert_eq!(config.report_format(), OutputFormat::Json);
    assert!(!config.security_enabled());
    assert_eq!(config.security_name(), "Night Desk");
    assert_eq!(config.employees().len(), 1);
    assert_eq!(config.employee(7).unwrap().id, EmployeeId(7));
    assert_eq!(config.script().len(), 2);
    assert_eq!(config.config_file(), temp_file.path().display().to_string());

    match &config.script()[1] {
        ScriptStep::Exit { visitor_id, at } => {
            assert_eq!(*visitor_id, 1);
            assert_eq!(at.to_rfc3339(), "2026-10-14T08:45:00+00:00");
        }
        other => panic!("expected exit step, got {:?}", other),
    }
}

#[test]
fn test_missing_sections_take_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[site]\nid = \"annex\"\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.site_id(), "annex");
    assert_eq!(config.report_format(), OutputFormat::Text);
    assert!(config.security_enabled());
    assert_eq!(config.security_name(), "Security Desk");
    assert!(config.employees().is_empty());
    assert!(config.script().is_empty());
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[[script]]\naction = \"teleport\"\n").unwrap();
    temp_file.flush().unwrap();

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config file"));
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.site_id(), "hq");
    assert_eq!(config.config_file(), "default");
    assert_eq!(config.employees().len(), 3);
    assert_eq!(config.script().len(), 9);
}

#[test]
fn test_shipped_dev_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/dev.toml");
    let config = Config::from_file(path).unwrap();

    assert_eq!(config.employees().len(), 3);
    assert!(config.security_enabled());
    assert_eq!(config.script().len(), 7);
}
