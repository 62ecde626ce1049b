//! sonar-export - SonarQube results to CSV
//!
//! Pages through the SonarQube web API and writes rules, issues, security
//! hotspots and rule-enriched findings to flat CSV files, one row per record.

pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod models;
pub mod sink;
