//! Rule enrichment for findings

use super::schema::{enrichment_fields, RULE_PREFIX};
use crate::error::Result;
use crate::http::endpoints::RULES_SHOW;
use crate::http::SonarClient;
use crate::models::Record;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

static CWE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CWE-\d+").expect("CWE pattern is valid"));

/// Outcome of a single rule lookup
#[derive(Debug, Clone, PartialEq)]
pub enum RuleLookup {
    Found(Record),
    NotFound,
}

/// Resolves rule keys to rule records
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn show_rule(&self, key: &str) -> Result<RuleLookup>;
}

#[async_trait]
impl RuleSource for SonarClient {
    async fn show_rule(&self, key: &str) -> Result<RuleLookup> {
        let query = [("key", key.to_string())];
        let body = self.get_json_optional(RULES_SHOW, &query).await?;
        match body.and_then(|mut b| b.get_mut("rule").map(Value::take)) {
            Some(Value::Object(rule)) => Ok(RuleLookup::Found(rule)),
            _ => Ok(RuleLookup::NotFound),
        }
    }
}

/// Every `CWE-<digits>` occurrence in the text, in order, duplicates kept
pub fn extract_cwe_codes(text: &str) -> Vec<String> {
    CWE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Adds the derived `cweCodes` list, taken from the markdown description
pub fn with_cwe_codes(mut rule: Record) -> Record {
    let codes = rule
        .get("mdDesc")
        .and_then(Value::as_str)
        .map(extract_cwe_codes)
        .unwrap_or_default();
    rule.insert(
        "cweCodes".to_string(),
        Value::Array(codes.into_iter().map(Value::String).collect()),
    );
    rule
}

/// Merges rule fields into a finding under the `rule.` prefix.
///
/// A missing rule still produces every `rule.*` key, set to `null`, so the
/// finding keeps its row and the rule columns come out empty.
pub fn merge_rule(mut finding: Record, lookup: &RuleLookup) -> Record {
    for field in enrichment_fields() {
        let value = match lookup {
            RuleLookup::Found(rule) => rule.get(field).cloned().unwrap_or(Value::Null),
            RuleLookup::NotFound => Value::Null,
        };
        finding.insert(format!("{RULE_PREFIX}{field}"), value);
    }
    finding
}

/// Caching front for a rule source. Lookup failures are logged and treated as misses.
pub struct RuleCatalog<'a, R: RuleSource + ?Sized> {
    source: &'a R,
    cache: HashMap<String, RuleLookup>,
    misses: u64,
}

impl<'a, R: RuleSource + ?Sized> RuleCatalog<'a, R> {
    pub fn new(source: &'a R) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            misses: 0,
        }
    }

    /// Looks up a rule, with `cweCodes` already derived
    pub async fn lookup(&mut self, key: Option<&str>) -> RuleLookup {
        let key = match key.map(str::trim) {
            Some(k) if !k.is_empty() => k,
            _ => {
                self.misses += 1;
                return RuleLookup::NotFound;
            }
        };

        if let Some(cached) = self.cache.get(key) {
            debug!("Rule {key} served from cache");
            if *cached == RuleLookup::NotFound {
                self.misses += 1;
            }
            return cached.clone();
        }

        let lookup = match self.source.show_rule(key).await {
            Ok(RuleLookup::Found(rule)) => RuleLookup::Found(with_cwe_codes(rule)),
            Ok(RuleLookup::NotFound) => {
                warn!("Rule {key} not found, exporting finding without rule details");
                RuleLookup::NotFound
            }
            Err(e) => {
                warn!("Rule lookup for {key} failed: {e}");
                self.misses += 1;
                return RuleLookup::NotFound;
            }
        };

        if lookup == RuleLookup::NotFound {
            self.misses += 1;
        }
        self.cache.insert(key.to_string(), lookup.clone());
        lookup
    }

    /// Lookups that produced no rule so far
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use serde_json::json;
    use std::sync::Mutex;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    struct FakeRules {
        calls: Mutex<Vec<String>>,
    }

    impl FakeRules {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RuleSource for FakeRules {
        async fn show_rule(&self, key: &str) -> Result<RuleLookup> {
            self.calls.lock().unwrap().push(key.to_string());
            match key {
                "broken:rule" => Err(ExportError::ApiError {
                    endpoint: "/api/rules/show".to_string(),
                    status: 500,
                }),
                "missing:rule" => Ok(RuleLookup::NotFound),
                _ => Ok(RuleLookup::Found(record(json!({
                    "key": key,
                    "name": "Some rule",
                    "mdDesc": "Avoid this. See CWE-79 and CWE-89, then CWE-79 again.",
                })))),
            }
        }
    }

    #[test]
    fn test_extract_cwe_codes() {
        assert_eq!(
            extract_cwe_codes("See CWE-79 and CWE-89 for details"),
            vec!["CWE-79", "CWE-89"]
        );
        assert!(extract_cwe_codes("No weakness mentioned, CWE- alone").is_empty());
        assert_eq!(extract_cwe_codes("CWE-1CWE-2 CWE-1"), vec!["CWE-1", "CWE-2", "CWE-1"]);
    }

    #[test]
    fn test_with_cwe_codes_without_description() {
        let rule = with_cwe_codes(record(json!({"key": "x"})));
        assert_eq!(rule["cweCodes"], json!([]));
    }

    #[test]
    fn test_merge_found_rule() {
        let finding = record(json!({"key": "f1", "ruleReference": "java:S1"}));
        let rule = record(json!({"key": "java:S1", "name": "Rule", "severity": "MAJOR", "cweCodes": ["CWE-1"]}));
        let merged = merge_rule(finding, &RuleLookup::Found(rule));

        assert_eq!(merged["key"], "f1");
        assert_eq!(merged["rule.key"], "java:S1");
        assert_eq!(merged["rule.severity"], "MAJOR");
        assert_eq!(merged["rule.cweCodes"], json!(["CWE-1"]));
        assert_eq!(merged["rule.lang"], Value::Null);
    }

    #[test]
    fn test_merge_not_found_keeps_every_rule_key() {
        let finding = record(json!({"key": "f1", "severity": "BLOCKER"}));
        let merged = merge_rule(finding, &RuleLookup::NotFound);

        assert_eq!(merged["severity"], "BLOCKER");
        for field in enrichment_fields() {
            assert_eq!(merged[&format!("rule.{field}")], Value::Null, "rule.{field}");
        }
    }

    #[tokio::test]
    async fn test_catalog_caches_rules() {
        let source = FakeRules::new();
        let mut catalog = RuleCatalog::new(&source);

        let first = catalog.lookup(Some("java:S1")).await;
        let second = catalog.lookup(Some("java:S1")).await;

        assert_eq!(first, second);
        assert_eq!(source.calls(), vec!["java:S1"]);
        match first {
            RuleLookup::Found(rule) => {
                assert_eq!(rule["cweCodes"], json!(["CWE-79", "CWE-89", "CWE-79"]))
            }
            RuleLookup::NotFound => panic!("expected rule"),
        }
        assert_eq!(catalog.misses(), 0);
    }

    #[tokio::test]
    async fn test_catalog_misses() {
        let source = FakeRules::new();
        let mut catalog = RuleCatalog::new(&source);

        assert_eq!(catalog.lookup(Some("missing:rule")).await, RuleLookup::NotFound);
        assert_eq!(catalog.lookup(Some("missing:rule")).await, RuleLookup::NotFound);
        assert_eq!(catalog.lookup(Some("broken:rule")).await, RuleLookup::NotFound);
        assert_eq!(catalog.lookup(Some("broken:rule")).await, RuleLookup::NotFound);
        assert_eq!(catalog.lookup(None).await, RuleLookup::NotFound);
        assert_eq!(catalog.lookup(Some("  ")).await, RuleLookup::NotFound);

        assert_eq!(catalog.misses(), 6);
        // Errors are not cached, definitive misses are
        assert_eq!(
            source.calls(),
            vec!["missing:rule", "broken:rule", "broken:rule"]
        );
    }
}
