//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml
//!
//! Timestamps in `[[script]]` steps are RFC 3339 strings.

use crate::domain::Employee;
use crate::io::OutputFormat;
use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site identifier used in logs (e.g., "hq", "lab-2")
    #[serde(default = "default_site_id")]
    pub id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { id: default_site_id() }
    }
}

fn default_site_id() -> String {
    "hq".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Subscribe a building-wide security channel
    #[serde(default = "default_security_enabled")]
    pub enabled: bool,
    /// Audience name used in security notices and reports
    #[serde(default = "default_security_name")]
    pub name: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { enabled: default_security_enabled(), name: default_security_name() }
    }
}

fn default_security_enabled() -> bool {
    true
}

fn default_security_name() -> String {
    "Security Desk".to_string()
}

/// One step of the visit script replayed by the session driver
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ScriptStep {
    Entry { visitor_id: u32, name: String, purpose: String, poc_id: u32, at: DateTime<Utc> },
    Exit { visitor_id: u32, at: DateTime<Utc> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    site_id: String,
    report_format: OutputFormat,
    security_enabled: bool,
    security_name: String,
    employees: Vec<Employee>,
    script: Vec<ScriptStep>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_id: default_site_id(),
            report_format: OutputFormat::Text,
            security_enabled: true,
            security_name: default_security_name(),
            employees: Self::default_employees(),
            script: Self::default_script(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    fn default_employees() -> Vec<Employee> {
        vec![
            Employee::new(1, "Ada Park", "Engineering Manager"),
            Employee::new(2, "Lee Chen", "Facilities Lead"),
            Employee::new(3, "Rosa Diaz", "Head of Sales"),
        ]
    }

    fn default_script() -> Vec<ScriptStep> {
        let at = |hour: u32, minute: u32| {
            Utc.with_ymd_and_hms(2026, 10, 14, hour, minute, 0).single().unwrap_or_default()
        };
        let entry = |visitor_id: u32, name: &str, purpose: &str, poc_id: u32, at| ScriptStep::Entry {
            visitor_id,
            name: name.to_string(),
            purpose: purpose.to_string(),
            poc_id,
            at,
        };
        vec![
            entry(101, "Sam Ortiz", "Interview", 1, at(9, 0)),
            entry(102, "Kim Reyes", "HVAC inspection", 2, at(9, 20)),
            entry(103, "Jo Baker", "Contract review", 3, at(10, 5)),
            entry(104, "Max Ito", "Pairing session", 1, at(10, 30)),
            ScriptStep::Exit { visitor_id: 101, at: at(11, 15) },
            ScriptStep::Exit { visitor_id: 102, at: at(12, 0) },
            entry(105, "Eve Novak", "Lunch & learn", 3, at(12, 10)),
            ScriptStep::Exit { visitor_id: 103, at: at(13, 40) },
            ScriptStep::Exit { visitor_id: 105, at: at(14, 0) },
        ]
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            site_id: toml_config.site.id,
            report_format: toml_config.report.format,
            security_enabled: toml_config.security.enabled,
            security_name: toml_config.security.name,
            employees: toml_config.employees,
            script: toml_config.script,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "config_fallback_to_defaults");
                Self::default()
            }
        }
    }

    /// Look up an employee from the roster
    pub fn employee(&self, id: u32) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id.0 == id)
    }

    // Getters for all config fields
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn report_format(&self) -> OutputFormat {
        self.report_format
    }

    pub fn security_enabled(&self) -> bool {
        self.security_enabled
    }

    pub fn security_name(&self) -> &str {
        &self.security_name
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn script(&self) -> &[ScriptStep] {
        &self.script
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Override the report format (CLI flag)
    pub fn with_report_format(mut self, format: OutputFormat) -> Self {
        self.report_format = format;
        self
    }

    /// Builder method for tests to replace the script
    #[cfg(test)]
    pub fn with_script(mut self, script: Vec<ScriptStep>) -> Self {
        self.script = script;
        self
    }

    /// Builder method for tests to disable the security channel
    #[cfg(test)]
    pub fn without_security(mut self) -> Self {
        self.security_enabled = false;
        self
    }
}
