//! Common test utilities

#![allow(dead_code)]

use serde_json::{json, Value};
use sonar_export::http::SonarClient;
use sonar_export::models::ExportConfig;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "squ_test_token";

/// Creates a test ExportConfig pointing to a wiremock server
pub fn test_config(host: &str, output_dir: &Path) -> ExportConfig {
    ExportConfig {
        host: host.to_string(),
        token: TEST_TOKEN.to_string(),
        output_dir: output_dir.to_path_buf(),
        timeout_secs: 10,
        user_agent: "sonar-export-test/0.1.0".to_string(),
        ..ExportConfig::default()
    }
}

pub fn test_client(config: &ExportConfig) -> SonarClient {
    SonarClient::from_config(config).expect("Failed to create client")
}

/// `count` records shaped `{"key": "<prefix>-<n>", ...extra}` starting at `start`
pub fn numbered(prefix: &str, start: usize, count: usize, extra: Value) -> Vec<Value> {
    (start..start + count)
        .map(|i| {
            let mut item = json!({ "key": format!("{prefix}-{i}") });
            if let (Some(obj), Some(extra)) = (item.as_object_mut(), extra.as_object()) {
                obj.extend(extra.clone());
            }
            item
        })
        .collect()
}

/// Mounts one page of a paged endpoint, expected to be requested exactly once
pub async fn mount_page(
    server: &MockServer,
    endpoint: &str,
    page: u32,
    extra: &[(&str, &str)],
    body: Value,
) {
    let mut mock = Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("p", page.to_string()))
        .and(query_param("ps", "100"));
    for (name, value) in extra {
        mock = mock.and(query_param(*name, *value));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a single page of projects
pub async fn mount_projects(server: &MockServer, keys: &[&str]) {
    let components: Vec<Value> = keys
        .iter()
        .map(|k| json!({"key": k, "name": k, "qualifier": "TRK", "visibility": "private"}))
        .collect();
    mount_page(
        server,
        "/api/projects/search",
        1,
        &[],
        json!({
            "paging": {"pageIndex": 1, "pageSize": 100, "total": keys.len()},
            "components": components
        }),
    )
    .await;
}
