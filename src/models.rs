//! Core data models for sonar-export

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A single record as returned by the API, keyed by field name
pub type Record = Map<String, Value>;

/// Fixed page size used for every paged endpoint
pub const PAGE_SIZE: u32 = 100;

/// The kinds of export the tool can produce
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Rules,
    Issues,
    Hotspots,
    Findings,
}

impl ExportKind {
    /// All kinds in the order `all` runs them
    pub const ALL: [ExportKind; 4] = [
        ExportKind::Rules,
        ExportKind::Issues,
        ExportKind::Hotspots,
        ExportKind::Findings,
    ];

    /// File name of the CSV produced for this kind
    pub fn file_name(&self) -> String {
        format!("sonarqube_{self}.csv")
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Rules => write!(f, "rules"),
            ExportKind::Issues => write!(f, "issues"),
            ExportKind::Hotspots => write!(f, "hotspots"),
            ExportKind::Findings => write!(f, "findings"),
        }
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" => Ok(ExportKind::Rules),
            "issues" => Ok(ExportKind::Issues),
            "hotspots" => Ok(ExportKind::Hotspots),
            "findings" => Ok(ExportKind::Findings),
            other => Err(format!("unknown export kind '{other}'")),
        }
    }
}

/// One page of a paged list endpoint
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Record>,
    /// Total number of records the server reports across all pages
    pub total: u64,
}

/// A SonarQube project, used to drive per-project exports
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qualifier: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub last_analysis_date: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

/// Configuration for an export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Base URL of the SonarQube server
    pub host: String,
    /// User token, sent as the basic-auth username
    #[serde(skip_serializing)]
    pub token: String,
    /// Directory the CSV files are written to
    pub output_dir: PathBuf,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Optional budget for the whole run in seconds
    pub max_runtime_secs: Option<u64>,
    /// Request rules in ascending order
    pub rules_ascending: bool,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:9000".to_string(),
            token: String::new(),
            output_dir: PathBuf::from("output"),
            timeout_secs: 30,
            max_runtime_secs: None,
            rules_ascending: true,
            user_agent: "sonar-export/0.1.0".to_string(),
        }
    }
}

/// Statistics for one completed export
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportStats {
    /// Rows written to the sink
    pub rows: u64,
    /// Pages fetched from paged endpoints
    pub pages: u64,
    /// Projects visited (per-project exports only)
    pub projects: u64,
    /// Findings whose rule could not be looked up
    pub enrichment_misses: u64,
}

/// Summary of one exporter run, as reported to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub kind: ExportKind,
    pub output_path: PathBuf,
    pub stats: ExportStats,
    /// HTTP requests issued while this export ran
    pub requests: u64,
}
