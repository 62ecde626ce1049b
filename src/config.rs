//! Configuration management for sonar-export

use crate::error::{ExportError, Result};
use crate::models::ExportConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings file structure (`config.json` or a `.toml` equivalent)
#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(rename = "SONARQUBE_HOST")]
    host: Option<String>,
    #[serde(rename = "SONARQUBE_TOKEN")]
    token: Option<String>,
}

/// Loads the settings file and merges it with defaults
pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExportError::ConfigError(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_settings(&content, is_toml(path))
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn parse_settings(content: &str, toml_format: bool) -> Result<ExportConfig> {
    let file: SettingsFile = if toml_format {
        toml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };

    let mut config = ExportConfig::default();

    if let Some(host) = file.host.filter(|h| !h.trim().is_empty()) {
        config.host = host.trim().trim_end_matches('/').to_string();
    }

    config.token = match file.token {
        Some(token) if !token.trim().is_empty() => token.trim().to_string(),
        _ => {
            return Err(ExportError::ConfigError(
                "SONARQUBE_TOKEN is missing or empty".to_string(),
            ))
        }
    };

    Ok(config)
}

/// Merges CLI arguments into an existing ExportConfig
pub fn merge_cli_args(
    config: &mut ExportConfig,
    output_dir: Option<PathBuf>,
    timeout: Option<u64>,
    max_runtime: Option<u64>,
) {
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(t) = timeout {
        config.timeout_secs = t;
    }
    if let Some(budget) = max_runtime {
        config.max_runtime_secs = Some(budget);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_settings() {
        let config = parse_settings(
            r#"{"SONARQUBE_HOST":"https://sonar.example.com/","SONARQUBE_TOKEN":"squ_abc"}"#,
            false,
        )
        .unwrap();
        assert_eq!(config.host, "https://sonar.example.com");
        assert_eq!(config.token, "squ_abc");
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_missing_host_uses_default() {
        let config = parse_settings(r#"{"SONARQUBE_TOKEN":"squ_abc"}"#, false).unwrap();
        assert_eq!(config.host, "http://localhost:9000");
    }

    #[test]
    fn test_missing_token_is_error() {
        let err = parse_settings(r#"{"SONARQUBE_HOST":"http://h"}"#, false).unwrap_err();
        assert!(matches!(err, ExportError::ConfigError(_)));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = parse_settings("{not json", false).unwrap_err();
        assert!(matches!(err, ExportError::JsonError(_)));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "SONARQUBE_HOST = \"http://sonar:9000\"").unwrap();
        writeln!(file, "SONARQUBE_TOKEN = \"t0ken\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.host, "http://sonar:9000");
        assert_eq!(config.token, "t0ken");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ExportError::ConfigError(_)));
    }

    #[test]
    fn test_merge_cli_args() {
        let mut config = ExportConfig::default();
        merge_cli_args(&mut config, Some(PathBuf::from("out")), Some(5), Some(600));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_runtime_secs, Some(600));
    }
}
