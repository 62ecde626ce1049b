//! Descriptors for the SonarQube endpoints the exporters consume

use crate::error::{ExportError, Result};
use crate::models::{Page, Record};
use serde_json::Value;

/// Where a paged endpoint reports its total record count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalLocation {
    /// `{"total": N}`
    Root,
    /// `{"paging": {"total": N}}`
    Paging,
}

/// A paged list endpoint: its path, the array holding the records, and where the total lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEndpoint {
    pub path: &'static str,
    pub container: &'static str,
    pub total: TotalLocation,
}

pub const PROJECTS_SEARCH: ListEndpoint = ListEndpoint {
    path: "/api/projects/search",
    container: "components",
    total: TotalLocation::Paging,
};

pub const ISSUES_SEARCH: ListEndpoint = ListEndpoint {
    path: "/api/issues/search",
    container: "issues",
    total: TotalLocation::Root,
};

pub const RULES_SEARCH: ListEndpoint = ListEndpoint {
    path: "/api/rules/search",
    container: "rules",
    total: TotalLocation::Root,
};

pub const HOTSPOTS_SEARCH: ListEndpoint = ListEndpoint {
    path: "/api/hotspots/search",
    container: "hotspots",
    total: TotalLocation::Paging,
};

/// Non-paged findings dump for one project (`?project=KEY`)
pub const EXPORT_FINDINGS: &str = "/api/projects/export_findings";

/// Single rule lookup (`?key=RULE`)
pub const RULES_SHOW: &str = "/api/rules/show";

impl ListEndpoint {
    /// Splits a page body into its records and total count
    pub fn parse_page(&self, mut body: Value, context: &str) -> Result<Page> {
        let total = match self.total {
            TotalLocation::Root => body.get("total"),
            TotalLocation::Paging => body.get("paging").and_then(|p| p.get("total")),
        }
        .and_then(Value::as_u64)
        .ok_or_else(|| ExportError::malformed(context, "missing total count"))?;

        let items = take_array(&mut body, self.container, context)?;
        Ok(Page {
            items: into_records(items, context)?,
            total,
        })
    }
}

/// Removes `field` from `body`, requiring it to be an array
pub fn take_array(body: &mut Value, field: &str, context: &str) -> Result<Vec<Value>> {
    match body.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(ExportError::malformed(
            context,
            format!("missing '{field}' array"),
        )),
    }
}

/// Requires every item to be a JSON object
pub fn into_records(items: Vec<Value>, context: &str) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(ExportError::malformed(
                context,
                format!("item {i} is not an object"),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_root_total() {
        let page = ISSUES_SEARCH
            .parse_page(json!({"total": 3, "issues": [{"key": "a"}, {"key": "b"}]}), "issues p=1")
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1]["key"], "b");
    }

    #[test]
    fn test_parse_paging_total() {
        let page = PROJECTS_SEARCH
            .parse_page(
                json!({"paging": {"pageIndex": 1, "pageSize": 100, "total": 1}, "components": [{"key": "p"}]}),
                "projects p=1",
            )
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_missing_container_is_malformed() {
        let err = HOTSPOTS_SEARCH
            .parse_page(json!({"paging": {"total": 5}}), "hotspots p=1")
            .unwrap_err();
        assert!(matches!(err, ExportError::MalformedResponse { .. }));
        assert!(err.to_string().contains("hotspots"));
    }

    #[test]
    fn test_missing_total_is_malformed() {
        let err = RULES_SEARCH
            .parse_page(json!({"rules": []}), "rules p=1")
            .unwrap_err();
        assert!(matches!(err, ExportError::MalformedResponse { .. }));
    }

    #[test]
    fn test_non_object_item_is_malformed() {
        let err = ISSUES_SEARCH
            .parse_page(json!({"total": 1, "issues": ["oops"]}), "issues p=1")
            .unwrap_err();
        assert!(err.to_string().contains("item 0"));
    }
}
